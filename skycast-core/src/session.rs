use tracing::{debug, info};

use crate::{
    client::WeatherClient,
    error::WeatherError,
    history::{SearchHistory, StateStore},
    model::WeatherRecord,
    theme::Theme,
};

/// Handle for one search. Only the most recently issued ticket may update
/// the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    query: String,
}

impl SearchTicket {
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// What happened to the session when a search completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The record was replaced; carries the theme derived from it.
    Updated(Theme),
    /// A newer search was started in the meantime; the result was discarded.
    Superseded,
}

/// Per-session state owned by the presentation layer: the current record,
/// search history and last searched city.
#[derive(Debug)]
pub struct Session {
    client: WeatherClient,
    store: StateStore,
    history: SearchHistory,
    current: Option<WeatherRecord>,
    generation: u64,
}

impl Session {
    /// Restore history from `store` and start with no weather shown.
    pub fn new(client: WeatherClient, store: StateStore) -> Self {
        let history = SearchHistory::load(store.clone());
        Self {
            client,
            store,
            history,
            current: None,
            generation: 0,
        }
    }

    pub fn current(&self) -> Option<&WeatherRecord> {
        self.current.as_ref()
    }

    /// Theme of the current record, [`Theme::Default`] before the first lookup.
    pub fn theme(&self) -> Theme {
        self.current
            .as_ref()
            .map(WeatherRecord::theme)
            .unwrap_or_default()
    }

    pub fn history(&self) -> &[String] {
        self.history.entries()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// City to show at startup: the last one looked up, else `fallback`.
    pub fn startup_city(&self, fallback: &str) -> String {
        self.store
            .last_city()
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Start a search. Any ticket issued earlier becomes stale.
    ///
    /// Blank queries are rejected before anything changes.
    pub fn begin(&mut self, query: &str) -> Result<SearchTicket, WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WeatherError::EmptyQuery);
        }

        self.generation += 1;
        debug!(generation = self.generation, query, "search started");

        Ok(SearchTicket {
            generation: self.generation,
            query: query.to_string(),
        })
    }

    /// Apply the result of the search identified by `ticket`.
    ///
    /// Results for stale tickets are dropped without touching the session.
    /// Errors leave the current record in place.
    pub fn complete(
        &mut self,
        ticket: SearchTicket,
        result: Result<WeatherRecord, WeatherError>,
    ) -> Result<SearchOutcome, WeatherError> {
        if ticket.generation != self.generation {
            info!(
                query = %ticket.query,
                generation = ticket.generation,
                latest = self.generation,
                "discarding superseded weather result"
            );
            return Ok(SearchOutcome::Superseded);
        }

        let record = result?;
        let theme = record.theme();

        self.history.record(&record.city);
        self.store.save_last_city(&record.city);
        self.current = Some(record);

        Ok(SearchOutcome::Updated(theme))
    }

    /// Look up `query` and apply the result.
    pub async fn search(&mut self, query: &str) -> Result<SearchOutcome, WeatherError> {
        let ticket = self.begin(query)?;
        let result = self.client.fetch(ticket.query()).await;
        self.complete(ticket, result)
    }
}
