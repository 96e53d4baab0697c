use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::models::stock::StockRecord;
use crate::utils::encoding::decode_text;

const BUNDLED_STOCK_LIST: &str = include_str!("../../resources/stock_list.txt");

/// 股票列表来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// 随程序打包的 resources/stock_list.txt
    Bundled,
    File(PathBuf),
}

/// 全部已知股票（只读），启动时加载一次
#[derive(Debug)]
pub struct StockCatalog {
    source: CatalogSource,
    stocks: OnceLock<Vec<StockRecord>>,
}

impl StockCatalog {
    pub fn new(source: CatalogSource) -> Self {
        Self {
            source,
            stocks: OnceLock::new(),
        }
    }

    pub fn bundled() -> Self {
        Self::new(CatalogSource::Bundled)
    }

    pub fn is_initialized(&self) -> bool {
        self.stocks.get().is_some()
    }

    /// 加载股票列表。已加载时直接返回；读取失败只记日志，目录保持为空，下次调用可重试。
    pub async fn initialize(&self) {
        if self.is_initialized() {
            return;
        }

        match self.load().await {
            Ok(stocks) => {
                let count = stocks.len();
                if self.stocks.set(stocks).is_ok() {
                    log::info!("股票数据加载完成，共 {} 条", count);
                }
            }
            Err(e) => log::error!("加载股票数据失败: {:#}", e),
        }
    }

    async fn load(&self) -> Result<Vec<StockRecord>> {
        let text = match &self.source {
            CatalogSource::Bundled => BUNDLED_STOCK_LIST.to_string(),
            CatalogSource::File(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("读取股票列表 {} 失败", path.display()))?;
                decode_text(&bytes)
            }
        };
        Ok(parse_stock_list(&text))
    }

    /// 按名称或代码做不区分大小写的子串匹配，关键词不去除首尾空白；空白关键词返回空结果
    pub fn search_stocks(&self, query: &str) -> Vec<StockRecord> {
        if query.trim().is_empty() {
            return vec![];
        }
        let needle = query.to_lowercase();
        self.get_all_stocks()
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle) || s.code.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// 按加载顺序返回全部股票
    pub fn get_all_stocks(&self) -> &[StockRecord] {
        self.stocks.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find_by_code(&self, code: &str) -> Option<&StockRecord> {
        self.get_all_stocks().iter().find(|s| s.code == code)
    }

    pub fn len(&self) -> usize {
        self.get_all_stocks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.get_all_stocks().is_empty()
    }
}

/// 每行 `名称|代码`，字段去除首尾空白；不足两个字段或字段为空的行跳过
pub fn parse_stock_list(text: &str) -> Vec<StockRecord> {
    text.lines()
        .filter_map(|line| {
            let mut parts = line.split('|');
            let name = parts.next()?.trim();
            let code = parts.next()?.trim();
            if name.is_empty() || code.is_empty() {
                return None;
            }
            Some(StockRecord::placeholder(name, code))
        })
        .collect()
}
