use std::fmt::Debug;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Stylize,
    text::Text,
    widgets::{StatefulWidgetRef, TableState, Widget},
};

use crate::slurm::{ClusterAggregates, UserCount};

use super::{
    misc::right_align_text,
    table::{GenericTable, GenericTableState},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Column {
    User,
    Jobs,
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self, f)
    }
}

/// Users with the most jobs, either cluster-wide or for a single partition
#[derive(Debug)]
pub struct UserTableState {
    table: TableState,
    /// Maximum number of users shown
    limit: usize,
    /// Partition shown; None for the whole cluster
    scope: Option<String>,
    users: Vec<UserCount>,
}

impl Default for UserTableState {
    fn default() -> Self {
        Self {
            table: TableState::default(),
            limit: 10,
            scope: None,
            users: Vec::new(),
        }
    }
}

impl UserTableState {
    const COLUMNS: [Column; 2] = [Column::User, Column::Jobs];

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    pub fn update(&mut self, summary: &ClusterAggregates) {
        // Fall back to the cluster-wide list if the partition disappeared
        if let Some(scope) = &self.scope {
            if !summary.top_users_by_partition.contains_key(scope) {
                self.scope = None;
            }
        }

        self.users.clear();
        self.users.extend(
            summary
                .top_users(self.scope.as_deref())
                .iter()
                .take(self.limit)
                .cloned(),
        );
    }

    /// Cycles between the whole cluster and each partition in turn
    pub fn cycle_scope(&mut self, summary: &ClusterAggregates) {
        let mut partitions = summary.top_users_by_partition.keys();
        self.scope = match &self.scope {
            None => partitions.next().cloned(),
            Some(scope) => partitions.skip_while(|v| *v != scope).nth(1).cloned(),
        };

        self.update(summary);
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn height(&self) -> u16 {
        self.users.len().max(1) as u16 + 1 // +1 for headers
    }
}

impl GenericTableState<Column> for UserTableState {
    fn focus(&self) -> bool {
        false
    }

    fn nrows(&self) -> usize {
        self.users.len()
    }

    fn columns(&self) -> &[Column] {
        &Self::COLUMNS
    }

    fn selected(&self) -> Option<usize> {
        None
    }

    fn variable_width(&self, column: Column) -> bool {
        matches!(column, Column::User)
    }

    fn text<'a>(&self, row: usize, column: Column) -> Text<'a> {
        let user = &self.users[row];
        match column {
            Column::User => user.user.clone().into(),
            Column::Jobs => right_align_text(user.count),
        }
    }

    fn inner_state(&mut self) -> &mut TableState {
        &mut self.table
    }
}

#[derive(Debug, Default)]
pub struct UserTable {}

impl StatefulWidgetRef for UserTable {
    type State = UserTableState;

    fn render_ref(&self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if state.users.is_empty() {
            Text::from("No users in queue.").italic().render(area, buf);
        } else {
            GenericTable::<Column, UserTableState>::new().render_ref(area, buf, state);
        }
    }
}
