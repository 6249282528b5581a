use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::SystemTime;

/// 目錄列表中的一個檔案
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// 相對於 storage 根目錄的路徑
    pub path: String,
    pub name: String,
    pub modified: SystemTime,
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// 只列出一般檔案；目錄不存在時回傳空列表
    fn list_files(&self, dir: &str) -> impl std::future::Future<Output = Result<Vec<StoredFile>>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

/// 取得頁面 HTML（或 JSON）原文
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl std::future::Future<Output = Result<String>> + Send;
}

impl<T: PageFetcher> PageFetcher for &T {
    fn fetch(&self, url: &str) -> impl std::future::Future<Output = Result<String>> + Send {
        T::fetch(self, url)
    }
}

impl<T: PageFetcher> PageFetcher for Arc<T> {
    fn fetch(&self, url: &str) -> impl std::future::Future<Output = Result<String>> + Send {
        T::fetch(self, url)
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Extracted: Send + 'static;
    type Transformed: Send + 'static;

    fn name(&self) -> &str;
    async fn extract(&self) -> Result<Self::Extracted>;
    async fn transform(&self, data: Self::Extracted) -> Result<Self::Transformed>;
    async fn load(&self, result: Self::Transformed) -> Result<String>;
}
