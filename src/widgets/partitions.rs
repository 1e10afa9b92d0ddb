use std::fmt::Debug;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Stylize},
    text::Text,
    widgets::{StatefulWidgetRef, TableState, Widget},
};

use crate::slurm::{PartitionGroup, StateClass};

use super::{
    misc::{right_align_text, scroll},
    table::{GenericTable, GenericTableState},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Column {
    Partition,
    State,
    Nodes,
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self, f)
    }
}

#[derive(Debug, Default)]
pub struct PartitionTableState {
    /// Does this widget have focus?
    focus: bool,
    table: TableState,
    /// Groups with at least one node
    groups: Vec<PartitionGroup>,
}

impl PartitionTableState {
    const COLUMNS: [Column; 3] = [Column::Partition, Column::State, Column::Nodes];

    pub fn focus(&mut self, focus: bool) {
        self.focus = focus;
    }

    pub fn update(&mut self, groups: &[PartitionGroup]) {
        self.groups.clear();
        self.groups
            .extend(groups.iter().filter(|v| v.nodes > 0).cloned());

        self.scroll(0);
    }

    pub fn scroll(&mut self, delta: isize) {
        scroll(&mut self.table, self.groups.len(), delta);
    }

    pub fn click(&mut self, row: usize) {
        let offset = self.table.offset().saturating_add(row);
        if offset < self.groups.len() {
            self.table.select(Some(offset));
        }
    }

    pub fn height(&self) -> u16 {
        self.groups.len() as u16 + 1 // +1 for headers
    }
}

impl GenericTableState<Column> for PartitionTableState {
    fn focus(&self) -> bool {
        self.focus
    }

    fn nrows(&self) -> usize {
        self.groups.len()
    }

    fn columns(&self) -> &[Column] {
        &Self::COLUMNS
    }

    fn selected(&self) -> Option<usize> {
        self.table.selected()
    }

    fn variable_width(&self, column: Column) -> bool {
        matches!(column, Column::Partition)
    }

    fn text<'a>(&self, row: usize, column: Column) -> Text<'a> {
        let group = &self.groups[row];
        match column {
            Column::Partition => group.name.clone().into(),
            Column::State => color_state_text(group),
            Column::Nodes => right_align_text(group.nodes),
        }
    }

    fn inner_state(&mut self) -> &mut TableState {
        &mut self.table
    }
}

#[derive(Debug, Default)]
pub struct PartitionTable {}

impl StatefulWidgetRef for PartitionTable {
    type State = PartitionTableState;

    fn render_ref(&self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if state.groups.is_empty() {
            Text::from("No node information available.")
                .italic()
                .render(area, buf);
        } else {
            GenericTable::<Column, PartitionTableState>::new().render_ref(area, buf, state);
        }
    }
}

/// Colorize the states of a group based on its most important state
fn color_state_text<'a>(group: &PartitionGroup) -> Text<'a> {
    let text = Text::from(group.state_label());

    match group.primary_state().class() {
        StateClass::Error => text.fg(Color::Red),
        StateClass::Busy => text.fg(Color::Green),
        StateClass::Available => text.fg(Color::Yellow),
        StateClass::Neutral => text.dim(),
    }
}
