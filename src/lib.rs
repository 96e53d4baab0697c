pub mod models;
pub mod services;
pub mod commands;
pub mod utils;

use std::sync::Arc;

use models::settings::AppSettings;
use services::ai_service::AIService;
use services::stock_catalog::{CatalogSource, StockCatalog};
use services::watchlist::WatchlistStore;

/// 应用状态：启动时构造一次，由界面层持有并传给各个命令
pub struct AppState {
    pub settings: AppSettings,
    pub catalog: Arc<StockCatalog>,
    pub ai: Arc<AIService>,
    pub watchlist: WatchlistStore,
}

impl AppState {
    /// 构造状态并加载股票列表。股票列表加载失败不影响启动。
    pub async fn initialize(settings: AppSettings) -> anyhow::Result<Self> {
        if settings.ai.api_key.trim().is_empty() {
            log::warn!("未配置 AI 接口密钥，分析功能将返回默认结果");
        }

        let source = match &settings.catalog_path {
            Some(path) => CatalogSource::File(path.clone()),
            None => CatalogSource::Bundled,
        };
        let catalog = Arc::new(StockCatalog::new(source));
        catalog.initialize().await;

        let ai = Arc::new(AIService::new(settings.ai.clone())?);
        let watchlist = WatchlistStore::new(catalog.clone(), ai.clone());

        Ok(Self {
            settings,
            catalog,
            ai,
            watchlist,
        })
    }

    pub async fn from_env() -> anyhow::Result<Self> {
        Self::initialize(AppSettings::from_env()).await
    }
}
