//! Joining bookmaker prices onto model matchups by player identity.

use crate::domain::model::{MarketOdds, MatchupRecord};

/// 比對用的球員識別：姓氏、名字首字母，以及完整緊縮名稱
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerKey {
    pub surname: String,
    pub initial: Option<char>,
    pub compact: String,
}

impl PlayerKey {
    /// 支援 `First Last`、`Last, First` 與 `Last F.` 三種寫法
    pub fn parse(name: &str) -> Self {
        let folded: String = name.chars().map(fold_char).collect::<String>().to_lowercase();

        let tokens: Vec<&str> = folded.split_whitespace().collect();
        let (given, surname): (Vec<&str>, Vec<&str>) = if let Some((last, first)) = folded.split_once(',') {
            (first.split_whitespace().collect(), last.split_whitespace().collect())
        } else if tokens.len() >= 2 && compact(tokens[tokens.len() - 1]).chars().count() == 1 {
            // `Sinner J.`
            let (rest, initial) = tokens.split_at(tokens.len() - 1);
            (initial.to_vec(), rest.to_vec())
        } else if let Some((last, rest)) = tokens.split_last() {
            (rest.to_vec(), vec![*last])
        } else {
            (Vec::new(), Vec::new())
        };

        let surname = compact(&surname.join(" "));
        let initial = given.first().and_then(|g| compact(g).chars().next());
        let compact_name = compact(&format!("{} {}", given.join(" "), surname));

        Self {
            surname,
            initial,
            compact: compact_name,
        }
    }

    /// 姓氏相同（或一方完整名稱以另一方多字姓氏結尾）且名字首字母不衝突
    pub fn same_player(&self, other: &PlayerKey) -> bool {
        if self.surname.is_empty() || other.surname.is_empty() {
            return false;
        }
        let initials_agree = match (self.initial, other.initial) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        };
        if !initials_agree {
            return false;
        }
        self.surname == other.surname
            || (other.surname.len() >= 4 && self.compact.ends_with(&other.surname))
            || (self.surname.len() >= 4 && other.compact.ends_with(&self.surname))
    }
}

fn compact(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

fn fold_char(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'ç' | 'ć' | 'č' => 'c',
        'Ç' | 'Ć' | 'Č' => 'C',
        'ď' | 'đ' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Í' | 'Î' => 'I',
        'ł' => 'l',
        'Ł' => 'L',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ő' => 'o',
        'Ó' | 'Ö' | 'Ø' => 'O',
        'ř' => 'r',
        'ś' | 'š' => 's',
        'Š' | 'Ś' => 'S',
        'ť' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ů' | 'ű' => 'u',
        'Ú' | 'Ü' => 'U',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        'Ž' | 'Ż' => 'Z',
        other => other,
    }
}

/// 將市場賠率填入對戰紀錄，回傳成功配對的數量
///
/// 未配對的對戰會清除舊的市場賠率，避免顯示過期價格。
pub fn merge_market_odds(matchups: &mut [MatchupRecord], market: &[MarketOdds]) -> usize {
    let keyed: Vec<(PlayerKey, PlayerKey, &MarketOdds)> = market
        .iter()
        .map(|m| (PlayerKey::parse(&m.player1), PlayerKey::parse(&m.player2), m))
        .collect();

    let mut matched = 0;
    for record in matchups.iter_mut() {
        let p1 = PlayerKey::parse(&record.player1);
        let p2 = PlayerKey::parse(&record.player2);

        let found = keyed.iter().find_map(|(m1, m2, odds)| {
            if p1.same_player(m1) && p2.same_player(m2) {
                Some((odds.player1_odds, odds.player2_odds))
            } else if p1.same_player(m2) && p2.same_player(m1) {
                Some((odds.player2_odds, odds.player1_odds))
            } else {
                None
            }
        });

        match found {
            Some((odds1, odds2)) => {
                record.player1_market_odds = Some(odds1);
                record.player2_market_odds = Some(odds2);
                matched += 1;
            }
            None => {
                record.player1_market_odds = None;
                record.player2_market_odds = None;
            }
        }
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(p1: &str, p2: &str, o1: f64, o2: f64) -> MarketOdds {
        MarketOdds {
            source: "book".to_string(),
            player1: p1.to_string(),
            player2: p2.to_string(),
            player1_odds: o1,
            player2_odds: o2,
        }
    }

    #[test]
    fn test_player_key_forms() {
        let full = PlayerKey::parse("Jannik Sinner");
        assert_eq!(full.surname, "sinner");
        assert_eq!(full.initial, Some('j'));

        let short = PlayerKey::parse("Sinner J.");
        assert_eq!(short.surname, "sinner");
        assert_eq!(short.initial, Some('j'));

        let comma = PlayerKey::parse("Sinner, Jannik");
        assert_eq!(comma, PlayerKey::parse("Jannik Sinner"));

        let accented = PlayerKey::parse("Tomás Martín Etcheverry");
        assert_eq!(accented.surname, "etcheverry");
        assert_eq!(accented.initial, Some('t'));
    }

    #[test]
    fn test_same_player() {
        let sinner = PlayerKey::parse("Jannik Sinner");
        assert!(sinner.same_player(&PlayerKey::parse("Sinner J.")));
        assert!(!sinner.same_player(&PlayerKey::parse("Sinner M.")));
        assert!(PlayerKey::parse("Alex de Minaur").same_player(&PlayerKey::parse("De Minaur A.")));
        assert!(PlayerKey::parse("Felix Auger-Aliassime").same_player(&PlayerKey::parse("Auger-Aliassime F.")));
        assert!(!PlayerKey::parse("").same_player(&PlayerKey::parse("")));
    }

    #[test]
    fn test_merge_handles_swapped_order() {
        let mut matchups = vec![
            MatchupRecord::new("Paris", "R32", "Jannik Sinner", "Tommy Paul", Some(78.3), Some(21.7)),
            MatchupRecord::new("Paris", "R32", "Alex de Minaur", "Frances Tiafoe", Some(60.0), Some(40.0)),
            MatchupRecord::new("Paris", "R32", "Casper Ruud", "Holger Rune", Some(52.0), Some(48.0)),
        ];
        matchups[2].player1_market_odds = Some(9.9);

        let odds = vec![
            market("Sinner J.", "Paul T.", 1.22, 4.5),
            market("Tiafoe F.", "De Minaur A.", 2.6, 1.5),
        ];

        let matched = merge_market_odds(&mut matchups, &odds);

        assert_eq!(matched, 2);
        assert_eq!(matchups[0].player1_market_odds, Some(1.22));
        assert_eq!(matchups[0].player2_market_odds, Some(4.5));
        assert_eq!(matchups[1].player1_market_odds, Some(1.5));
        assert_eq!(matchups[1].player2_market_odds, Some(2.6));
        assert_eq!(matchups[2].player1_market_odds, None);
    }
}
