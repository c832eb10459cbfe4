use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use super::domain::{Application, ApplicationId, ApplicationStatus};

/// What a drag identifier refers to once resolved.
///
/// The drag layer hands back plain strings that may name either a column or a card. Status
/// labels win; anything else is taken as an application identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Column(ApplicationStatus),
    Card(ApplicationId),
}

impl DropTarget {
    pub fn parse(raw: &str) -> Self {
        match ApplicationStatus::from_label(raw) {
            Some(status) => Self::Column(status),
            None => Self::Card(ApplicationId(raw.to_string())),
        }
    }
}

/// Applications currently believed to hold one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub status: ApplicationStatus,
    pub items: Vec<Application>,
}

impl Column {
    fn empty(status: ApplicationStatus) -> Self {
        Self {
            status,
            items: Vec::new(),
        }
    }

    pub fn position(&self, id: &ApplicationId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Serializable per-column view used by reports and the board endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSummary {
    pub status: &'static str,
    pub count: usize,
    pub application_ids: Vec<ApplicationId>,
}

/// A cross-column move the backend has to be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransition {
    pub application_id: ApplicationId,
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    pub index: usize,
}

/// Result of reconciling a drop with the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// Nothing moved: unknown identifiers, no drop target, or a drop onto itself.
    Unchanged,
    /// Visual reorder inside one column. Never reaches the backend.
    Reordered {
        status: ApplicationStatus,
        from: usize,
        to: usize,
    },
    Moved(StatusTransition),
}

impl DragOutcome {
    pub fn transition(&self) -> Option<&StatusTransition> {
        match self {
            Self::Moved(transition) => Some(transition),
            _ => None,
        }
    }
}

/// Client-side partition of one job posting's applications by status.
///
/// Every application identifier lives in at most one column, and the column key always equals
/// the status carried by the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    columns: [Column; ApplicationStatus::COUNT],
    active: Option<Application>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            columns: ApplicationStatus::ordered().map(Column::empty),
            active: None,
        }
    }
}

impl Board {
    pub fn new(applications: Vec<Application>) -> Self {
        let mut board = Self::default();
        board.refresh(applications);
        board
    }

    /// Replace the whole partition with the authoritative list.
    pub fn refresh(&mut self, applications: Vec<Application>) {
        let mut columns = ApplicationStatus::ordered().map(Column::empty);
        let mut seen = HashSet::with_capacity(applications.len());

        for application in applications {
            if !seen.insert(application.id.clone()) {
                warn!(application_id = %application.id, "duplicate application in refresh, keeping first");
                continue;
            }
            columns[application.status.position()]
                .items
                .push(application);
        }

        self.columns = columns;
        self.active = None;
        debug!(total = self.len(), "board refreshed");
    }

    /// Resolve a drag identifier to the column it belongs to.
    pub fn locate(&self, raw: &str) -> Option<ApplicationStatus> {
        self.resolve(&DropTarget::parse(raw))
    }

    pub fn resolve(&self, target: &DropTarget) -> Option<ApplicationStatus> {
        match target {
            DropTarget::Column(status) => Some(*status),
            DropTarget::Card(id) => self
                .columns
                .iter()
                .find(|column| column.position(id).is_some())
                .map(|column| column.status),
        }
    }

    pub fn on_drag_start(&mut self, active_id: &str) {
        let id = ApplicationId(active_id.to_string());
        self.active = self.application(&id).cloned();
        if self.active.is_none() {
            debug!(active_id, "drag started on unknown item");
        }
    }

    pub fn on_drag_cancel(&mut self) {
        self.active = None;
    }

    /// Apply a drop. The dragged item is cleared whatever the outcome.
    pub fn on_drag_end(&mut self, active_id: &str, over_id: Option<&str>) -> DragOutcome {
        let outcome = self.apply_drop(active_id, over_id);
        self.active = None;
        debug!(active_id, ?over_id, ?outcome, "drag ended");
        outcome
    }

    fn apply_drop(&mut self, active_id: &str, over_id: Option<&str>) -> DragOutcome {
        let Some(over_id) = over_id else {
            return DragOutcome::Unchanged;
        };
        let (Some(source), Some(destination)) = (self.locate(active_id), self.locate(over_id))
        else {
            return DragOutcome::Unchanged;
        };

        let active = ApplicationId(active_id.to_string());
        let Some(from) = self.column(source).position(&active) else {
            // A column identifier was dragged rather than a card.
            return DragOutcome::Unchanged;
        };
        let over = DropTarget::parse(over_id);

        if source == destination {
            let DropTarget::Card(over_card) = over else {
                return DragOutcome::Unchanged;
            };
            let column = self.column_mut(source);
            let Some(to) = column.position(&over_card) else {
                return DragOutcome::Unchanged;
            };
            if from == to {
                return DragOutcome::Unchanged;
            }
            let item = column.items.remove(from);
            column.items.insert(to, item);
            return DragOutcome::Reordered {
                status: source,
                from,
                to,
            };
        }

        let mut item = self.column_mut(source).items.remove(from);
        item.status = destination;

        let column = self.column_mut(destination);
        let index = match over {
            DropTarget::Card(over_card) => column.position(&over_card).unwrap_or(column.len()),
            DropTarget::Column(_) => column.len(),
        };
        column.items.insert(index, item);

        DragOutcome::Moved(StatusTransition {
            application_id: active,
            from: source,
            to: destination,
            index,
        })
    }

    pub fn column(&self, status: ApplicationStatus) -> &Column {
        &self.columns[status.position()]
    }

    fn column_mut(&mut self, status: ApplicationStatus) -> &mut Column {
        &mut self.columns[status.position()]
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn application(&self, id: &ApplicationId) -> Option<&Application> {
        self.columns
            .iter()
            .flat_map(|column| column.items.iter())
            .find(|item| &item.id == id)
    }

    pub fn active(&self) -> Option<&Application> {
        self.active.as_ref()
    }

    pub fn summary(&self) -> Vec<ColumnSummary> {
        self.columns
            .iter()
            .map(|column| ColumnSummary {
                status: column.status.label(),
                count: column.len(),
                application_ids: column.items.iter().map(|item| item.id.clone()).collect(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
