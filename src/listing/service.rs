//! Account listing orchestration

use crate::error::{AppError, Result};
use crate::listing::error::ValidationError;
use crate::listing::filter::QueryFilterBuilder;
use crate::listing::request::ListingRequest;
use crate::metrics::{LISTING_DURATION_SECONDS, LISTING_REQUESTS_TOTAL};
use crate::models::MessageEvent;
use crate::notifications::{DispatchDecision, NotificationDispatcher};
use crate::search::{AggregationPlanner, ResultPage, SearchExecutor, SearchQuery, SearchSort};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Runs account listings and optionally hands message events to the dispatcher
pub struct ListingService {
    executor: Arc<dyn SearchExecutor>,
    filter_builder: QueryFilterBuilder,
    planner: AggregationPlanner,
    dispatcher: Option<Arc<NotificationDispatcher>>,
}

impl ListingService {
    pub fn new(executor: Arc<dyn SearchExecutor>) -> Self {
        Self {
            executor,
            filter_builder: QueryFilterBuilder::new(),
            planner: AggregationPlanner::new(),
            dispatcher: None,
        }
    }

    pub fn with_dispatcher(mut self, dispatcher: Arc<NotificationDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Combined search query for a request
    ///
    /// Filters and facets are derived independently of each other.
    pub fn build_query(&self, request: &ListingRequest) -> std::result::Result<SearchQuery, ValidationError> {
        let filters = self.filter_builder.build(request)?;
        let boost = self.filter_builder.boost(request)?;
        let aggregations = self.planner.plan();
        let sort = request.sort().map(SearchSort::from).unwrap_or_default();

        Ok(SearchQuery::new(request.query())
            .with_filters(filters)
            .with_boost(boost)
            .with_sort(sort)
            .with_aggregations(aggregations)
            .with_page(request.page(), request.per_page()))
    }

    /// List accounts for a request
    pub async fn list(&self, request: &ListingRequest) -> Result<ResultPage> {
        let timer = Instant::now();
        let actor = request.actor();

        let result = match self.build_query(request) {
            Ok(query) => self.executor.execute(&query).await.map_err(AppError::from),
            Err(e) => Err(e.into()),
        };

        LISTING_DURATION_SECONDS.observe(timer.elapsed().as_secs_f64());
        LISTING_REQUESTS_TOTAL
            .with_label_values(&[outcome_label(&result)])
            .inc();

        match &result {
            Ok(page) => info!(
                account_id = actor.account_id,
                company_id = actor.company_id,
                total_count = page.total_count,
                page = request.page(),
                took_ms = page.took,
                "Account listing served"
            ),
            Err(AppError::SearchQuery(message)) => error!(
                account_id = actor.account_id,
                company_id = actor.company_id,
                q = request.query(),
                error = %message,
                "Listing produced a malformed search query"
            ),
            Err(e) => warn!(
                account_id = actor.account_id,
                company_id = actor.company_id,
                error = %e,
                "Account listing failed"
            ),
        }

        result
    }

    /// List accounts, then hand `event` to the dispatcher
    ///
    /// The dispatch never delays or alters the returned page. `None` means no
    /// event was given or no dispatcher is configured.
    pub async fn list_and_notify(
        &self,
        request: &ListingRequest,
        event: Option<&MessageEvent>,
    ) -> Result<(ResultPage, Option<DispatchDecision>)> {
        let page = self.list(request).await?;
        let decision = event.and_then(|event| self.notify(event));
        Ok((page, decision))
    }

    /// Hand an event to the dispatcher without waiting
    pub fn notify(&self, event: &MessageEvent) -> Option<DispatchDecision> {
        self.dispatcher
            .as_ref()
            .map(|dispatcher| dispatcher.dispatch(event))
    }

    pub fn dispatcher(&self) -> Option<&Arc<NotificationDispatcher>> {
        self.dispatcher.as_ref()
    }
}

fn outcome_label(result: &Result<ResultPage>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(AppError::Validation(_)) => "validation_error",
        Err(AppError::SearchUnavailable(_)) => "search_unavailable",
        Err(AppError::SearchQuery(_)) => "search_query_error",
        Err(_) => "error",
    }
}
