use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use crate::models::{ChartSpec, CombinedTable, Field, SelectionState, Symbol};
use crate::services::chart_service;

const EVENT_QUEUE_DEPTH: usize = 32;

/// A control change coming from the dashboard. Each one replaces exactly one
/// field of the selection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    SelectField { field: Field },
    SelectTickers { tickers: Vec<Symbol> },
    ToggleNormalization { active: bool },
}

/// One dashboard session: a fetched table, the current selection and the
/// chart region subscribers are watching.
pub struct Document {
    id: Uuid,
    table: Arc<CombinedTable>,
    selection: SelectionState,
    chart: watch::Sender<Arc<ChartSpec>>,
}

impl Document {
    pub fn new(
        id: Uuid,
        table: Arc<CombinedTable>,
        selection: SelectionState,
    ) -> (Self, watch::Receiver<Arc<ChartSpec>>) {
        let initial = Arc::new(chart_service::build(&table, &selection));
        let (chart, chart_rx) = watch::channel(initial);
        (
            Self {
                id,
                table,
                selection,
                chart,
            },
            chart_rx,
        )
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Applies one event and replaces the chart region.
    pub fn apply(&mut self, event: UiEvent) -> Arc<ChartSpec> {
        match event {
            UiEvent::SelectField { field } => self.selection.field = field,
            UiEvent::SelectTickers { tickers } => self.selection.set_tickers(tickers),
            UiEvent::ToggleNormalization { active } => self.selection.normalize = active,
        }
        debug!("Session {} redraw with {:?}", self.id, self.selection);

        let chart = Arc::new(chart_service::build(&self.table, &self.selection));
        self.chart.send_replace(chart.clone());
        chart
    }

    /// Drains the event queue one event at a time until every sender is gone.
    pub async fn run(mut self, mut events: mpsc::Receiver<UiEvent>) {
        while let Some(event) = events.recv().await {
            self.apply(event);
        }
        debug!("Session {} event queue closed", self.id);
    }
}

/// Handle to a running document task.
pub struct DocumentHandle {
    pub id: Uuid,
    pub events: mpsc::Sender<UiEvent>,
    pub chart: watch::Receiver<Arc<ChartSpec>>,
    pub task: JoinHandle<()>,
}

pub fn spawn_document(table: Arc<CombinedTable>, selection: SelectionState) -> DocumentHandle {
    let id = Uuid::new_v4();
    let (document, chart) = Document::new(id, table, selection);
    let (events, events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    let task = tokio::spawn(document.run(events_rx));

    DocumentHandle {
        id,
        events,
        chart,
        task,
    }
}
