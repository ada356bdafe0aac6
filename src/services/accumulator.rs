// 搜索结果累积
//
// 一次搜索会话从 submit 开始，之后可多次 load_more 追加下一页。
// 每个请求都携带代号（generation），响应到达时若代号已不是最新，
// 结果被丢弃，不会合并进当前状态。

use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::external::CatalogSource;
use crate::models::{AccumulatedResults, FilterSpec, MangaSummary, ResultPage, SessionView};
use crate::services::content_gate::{ContentGate, RevealLedger, RevealResponse, Visibility};
use crate::services::error::{DiscoveryError, PreferenceError};
use crate::services::query_builder::fetch_page;

/// 累积状态机，不涉及网络
#[derive(Debug, Default)]
pub struct ResultAccumulator {
    generation: u64,
    is_loading: bool,
    spec: Option<FilterSpec>,
    results: AccumulatedResults,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn results(&self) -> &AccumulatedResults {
        &self.results
    }

    /// 当前结果对应的搜索条件
    pub fn active_spec(&self) -> Option<&FilterSpec> {
        self.spec.as_ref()
    }

    /// 开始新的搜索，之前所有未完成的请求都作废
    pub fn begin_submit(&mut self) -> u64 {
        self.generation += 1;
        self.is_loading = true;
        self.generation
    }

    /// 开始加载下一页
    ///
    /// 返回 `None` 表示无需请求：已加载全部结果，或已有请求在进行中。
    pub fn begin_load_more(&mut self) -> Result<Option<(u64, FilterSpec)>, DiscoveryError> {
        let spec = self.spec.as_ref().ok_or(DiscoveryError::NoActiveSearch)?;

        if self.is_loading || !self.results.has_more() {
            return Ok(None);
        }

        let next = spec.with_page(self.results.current_page + 1);
        self.is_loading = true;
        Ok(Some((self.generation, next)))
    }

    fn check_current(&self, generation: u64) -> Result<(), DiscoveryError> {
        if generation != self.generation {
            tracing::debug!(
                "Dropping stale response (generation {} < {})",
                generation,
                self.generation
            );
            return Err(DiscoveryError::Superseded {
                generation: self.generation,
            });
        }
        Ok(())
    }

    /// 完成 submit：成功时用第一页替换全部结果，失败时清空结果
    pub fn finish_submit(
        &mut self,
        generation: u64,
        spec: FilterSpec,
        outcome: Result<ResultPage, DiscoveryError>,
    ) -> Result<ResultPage, DiscoveryError> {
        self.check_current(generation)?;
        self.is_loading = false;

        // 失败的新搜索同样成为当前搜索，旧结果不再保留
        let page = match outcome {
            Ok(page) => page,
            Err(e) => {
                self.results = AccumulatedResults::default();
                self.spec = Some(spec);
                return Err(e);
            }
        };
        self.results = AccumulatedResults {
            items: page.items.clone(),
            total: Self::effective_total(&page, page.items.len()),
            current_page: page.page_index,
        };
        self.spec = Some(spec);

        Ok(page)
    }

    /// 完成 load_more：成功时按返回顺序追加
    pub fn finish_load_more(
        &mut self,
        generation: u64,
        outcome: Result<ResultPage, DiscoveryError>,
    ) -> Result<ResultPage, DiscoveryError> {
        self.check_current(generation)?;
        self.is_loading = false;

        let page = outcome?;
        self.results.items.extend(page.items.iter().cloned());
        self.results.total = Self::effective_total(&page, self.results.items.len());
        self.results.current_page = page.page_index;

        Ok(page)
    }

    // 上游返回空页时视为已到末尾，避免无限加载
    fn effective_total(page: &ResultPage, loaded: usize) -> u64 {
        if page.items.is_empty() {
            loaded as u64
        } else {
            page.total_available
        }
    }
}

struct SessionState {
    accumulator: ResultAccumulator,
    ledger: RevealLedger,
}

/// 一次搜索会话
///
/// 锁只在读写状态时持有，不跨越上游请求。
pub struct SearchSession {
    source: Arc<dyn CatalogSource>,
    page_size: u32,
    state: Mutex<SessionState>,
}

impl SearchSession {
    pub fn new(source: Arc<dyn CatalogSource>, page_size: u32) -> Self {
        Self {
            source,
            page_size,
            state: Mutex::new(SessionState {
                accumulator: ResultAccumulator::new(),
                ledger: RevealLedger::new(),
            }),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// 提交新的搜索条件，加载第一页
    pub async fn submit(&self, spec: FilterSpec) -> Result<ResultPage, DiscoveryError> {
        let spec = spec.with_page(1);

        let generation = {
            let mut state = self.state.lock().await;
            state.ledger.reset();
            state.accumulator.begin_submit()
        };

        let outcome = fetch_page(self.source.as_ref(), &spec, self.page_size).await;
        if let Err(e) = &outcome {
            tracing::error!("Search failed: {}", e);
        }

        let mut state = self.state.lock().await;
        let page = state.accumulator.finish_submit(generation, spec, outcome)?;
        tracing::info!(
            "Search loaded {} of {} results",
            page.items.len(),
            state.accumulator.results().total
        );
        Ok(page)
    }

    /// 加载下一页；已加载全部结果时返回 `Ok(None)` 且不发起请求
    pub async fn load_more(&self) -> Result<Option<ResultPage>, DiscoveryError> {
        let (generation, spec) = match self.state.lock().await.accumulator.begin_load_more()? {
            Some(next) => next,
            None => return Ok(None),
        };

        let outcome = fetch_page(self.source.as_ref(), &spec, self.page_size).await;
        if let Err(e) = &outcome {
            tracing::error!("Loading page {} failed: {}", spec.page, e);
        }

        let mut state = self.state.lock().await;
        state.accumulator.finish_load_more(generation, outcome).map(Some)
    }

    pub async fn snapshot(&self) -> AccumulatedResults {
        self.state.lock().await.accumulator.results().clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.accumulator.is_loading()
    }

    pub async fn active_spec(&self) -> Option<FilterSpec> {
        self.state.lock().await.accumulator.active_spec().cloned()
    }

    /// 渲染带可见性的会话视图
    pub async fn view(&self, session_id: Uuid, gate: &ContentGate) -> SessionView {
        let state = self.state.lock().await;
        let results = state.accumulator.results();

        SessionView {
            session_id,
            items: gate.annotate(&results.items, &state.ledger).await,
            total: results.total,
            current_page: results.current_page,
            has_more: results.has_more(),
            is_loading: state.accumulator.is_loading(),
            adult_content_enabled: gate.preferences().is_adult_content_enabled().await,
        }
    }

    /// 处理某个条目的揭示确认；条目不在当前结果中时返回 `Ok(None)`
    pub async fn reveal(
        &self,
        gate: &ContentGate,
        manga_id: &str,
        response: RevealResponse,
    ) -> Result<Option<Visibility>, PreferenceError> {
        let item = match self.find_item(manga_id).await {
            Some(item) => item,
            None => return Ok(None),
        };

        // 写偏好文件时不持有会话锁
        gate.persist_choice(&response).await?;

        let mut state = self.state.lock().await;
        let visibility = gate.apply_reveal(&item, &mut state.ledger, &response).await;
        Ok(Some(visibility))
    }

    async fn find_item(&self, manga_id: &str) -> Option<MangaSummary> {
        self.state
            .lock()
            .await
            .accumulator
            .results()
            .items
            .iter()
            .find(|m| m.id == manga_id)
            .cloned()
    }
}
