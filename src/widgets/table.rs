use std::{fmt::Display, marker::PhantomData};

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Stylize,
    text::Text,
    widgets::{
        Row, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, StatefulWidgetRef,
        Table, TableState,
    },
};

use crate::view::SortDirection;

use super::misc::COLUMN_SPACING;

pub trait GenericTableState<C>
where
    C: Copy + Display + PartialEq + Sized,
{
    fn focus(&self) -> bool;

    fn nrows(&self) -> usize;

    fn columns(&self) -> &[C];

    /// Column marked as the sort column, if any
    fn sort_column(&self) -> Option<(C, SortDirection)> {
        None
    }

    /// Returns the text object for a given row and column
    fn text<'a>(&self, row: usize, column: C) -> Text<'a>;
    /// Returns true if a column should grow to consume available space
    fn variable_width(&self, column: C) -> bool;

    /// Returns TableState object used by the actual table
    fn inner_state(&mut self) -> &mut TableState;
    /// Returns the currently selected item
    fn selected(&self) -> Option<usize>;

    /// Called with the horizontal extent of every column after rendering
    fn set_column_layout(&mut self, _layout: Vec<(C, u16, u16)>) {}
}

#[derive(Debug, Default)]
pub struct GenericTable<C, S>
where
    C: Copy + Display + PartialEq + Sized,
    S: GenericTableState<C>,
{
    c: PhantomData<C>,
    s: PhantomData<S>,
}

impl<C, S> GenericTable<C, S>
where
    C: Copy + Display + PartialEq + Sized,
    S: GenericTableState<C>,
{
    pub fn new() -> Self {
        Self {
            c: PhantomData,
            s: PhantomData,
        }
    }

    fn width(state: &S, column: C, sort_column: bool) -> Option<u16> {
        if state.variable_width(column) {
            None
        } else {
            let mut width = column.to_string().chars().count();
            if sort_column {
                width += 2;
            }

            for row in 0..state.nrows() {
                width = state.text(row, column).width().max(width);
            }

            Some(width as u16)
        }
    }

    fn widths(state: &S, area: Rect) -> Vec<u16> {
        let sort_column = state.sort_column().map(|(c, _)| c);
        let widths = state
            .columns()
            .iter()
            .map(|c| Self::width(state, *c, sort_column == Some(*c)))
            .collect::<Vec<_>>();

        let variable_length_columns = widths.iter().filter(|v| v.is_none()).count() as u16;
        let fixed_column_width = widths.iter().map(|v| v.unwrap_or_default()).sum::<u16>();
        let spacing_width = (widths.len().saturating_sub(1)) as u16 * COLUMN_SPACING;
        let fixed_width = spacing_width + fixed_column_width;
        let variable_width = area.width.saturating_sub(fixed_width) / variable_length_columns.max(1);

        widths
            .into_iter()
            .map(|v| v.unwrap_or(variable_width))
            .collect()
    }

    fn header(state: &S) -> Row<'static> {
        let sort_column = state.sort_column();
        let mut columns = Vec::new();
        for column in state.columns() {
            let mut label = column.to_string();
            match sort_column {
                Some((c, SortDirection::Ascending)) if c == *column => label.push_str(" ▲"),
                Some((c, SortDirection::Descending)) if c == *column => label.push_str(" ▼"),
                _ => {}
            }

            columns.push(label);
        }

        Row::new(columns).bold()
    }
}

impl<C, S> StatefulWidgetRef for GenericTable<C, S>
where
    C: Copy + Display + PartialEq + Sized,
    S: GenericTableState<C>,
{
    type State = S;

    fn render_ref(&self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let area = render_scrollbar(area, buf, 1, state.nrows(), state.selected());
        let widths = GenericTable::<C, S>::widths(state, area);

        let mut rows = Vec::new();
        for idx in 0..state.nrows() {
            let mut row = Row::new(
                state
                    .columns()
                    .iter()
                    .map(|&c| state.text(idx, c))
                    .collect::<Vec<_>>(),
            );

            // Used instead of Table::highlight_style so that it doesn't override the style of individual cells
            if state.selected() == Some(idx) && state.focus() {
                row = row.reversed();
            }

            rows.push(row);
        }

        let mut layout = Vec::new();
        let mut x = area.x;
        for (column, width) in state.columns().iter().zip(&widths) {
            layout.push((*column, x, *width));
            x = x.saturating_add(width + COLUMN_SPACING);
        }

        let table = Table::new(rows, widths.iter().map(|&w| Constraint::Length(w)))
            .column_spacing(COLUMN_SPACING)
            .header(Self::header(state));

        table.render(area, buf, state.inner_state());
        state.set_column_layout(layout);
    }
}

/// Draws a scrollbar along the right edge of `area` below `header` rows,
/// returning the remaining area
fn render_scrollbar(
    area: Rect,
    buf: &mut Buffer,
    header: u16,
    items: usize,
    selected: Option<usize>,
) -> Rect {
    let mut state = ScrollbarState::default()
        .content_length(items)
        .position(selected.unwrap_or_default());

    let [table, bar] =
        Layout::horizontal([Constraint::Percentage(100), Constraint::Length(2)]).areas(area);
    let [_, bar] = Layout::vertical([Constraint::Length(header), Constraint::Percentage(100)])
        .areas(bar);

    Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(None)
        .end_symbol(None)
        .track_symbol(None)
        .thumb_symbol("▐")
        .render(bar, buf, &mut state);

    table
}
