use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Stylize},
    symbols::border,
    text::Text,
    widgets::{Block, Borders, StatefulWidgetRef, TableState, Widget},
};

use crate::slurm::{format_duration, EnrichedJob, PENDING, RUNNING};
use crate::view::{SortDirection, SortKey, ViewControls};

use super::{
    misc::{center_layout, right_align_text, scroll},
    table::{GenericTable, GenericTableState},
};

#[derive(Debug, Default)]
pub struct JobTableState {
    focus: bool,
    table: TableState,
    jobs: Vec<EnrichedJob>,
    sort: (SortKey, SortDirection),
    /// Is a filter active? Used to pick the message shown for an empty table
    filtered: bool,
    /// Column positions from the last render, used for mouse clicks on the header
    layout: Vec<(SortKey, u16, u16)>,
}

impl JobTableState {
    pub fn focus(&mut self, focus: bool) {
        self.focus = focus;
    }

    pub fn update(&mut self, jobs: &[&EnrichedJob], controls: &ViewControls) {
        self.jobs.clear();
        self.jobs.extend(jobs.iter().map(|&job| job.clone()));
        self.sort = (controls.sort_key, controls.sort_dir);
        self.filtered = !controls.filter_text.is_empty();

        // Update/clear job selection depending on the new contents
        self.scroll(0);
    }

    pub fn scroll(&mut self, delta: isize) {
        scroll(&mut self.table, self.jobs.len(), delta);
    }

    /// Selects the job at `row` rows below the header
    pub fn click(&mut self, row: usize) {
        let offset = self.table.offset().saturating_add(row);
        if offset < self.jobs.len() {
            self.table.select(Some(offset));
        }
    }

    /// Returns the column rendered at terminal column `x`
    pub fn column_at(&self, x: u16) -> Option<SortKey> {
        self.layout
            .iter()
            .find(|(_, start, width)| x >= *start && x < start.saturating_add(*width))
            .map(|(key, _, _)| *key)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn empty_message(&self) -> &'static str {
        if self.filtered {
            "No jobs match the filter."
        } else {
            "No jobs in the queue."
        }
    }
}

impl GenericTableState<SortKey> for JobTableState {
    fn focus(&self) -> bool {
        self.focus
    }

    fn nrows(&self) -> usize {
        self.jobs.len()
    }

    fn columns(&self) -> &[SortKey] {
        &SortKey::ALL
    }

    fn sort_column(&self) -> Option<(SortKey, SortDirection)> {
        Some(self.sort)
    }

    fn selected(&self) -> Option<usize> {
        self.table.selected()
    }

    fn variable_width(&self, column: SortKey) -> bool {
        matches!(column, SortKey::Name)
    }

    fn text<'a>(&self, row: usize, column: SortKey) -> Text<'a> {
        let job = &self.jobs[row];
        match column {
            SortKey::JobId => right_align_text(job.job_id),
            SortKey::UserName => job.user_name.clone().into(),
            SortKey::JobState => match job.state() {
                RUNNING => Text::from(RUNNING).fg(Color::Green),
                PENDING => Text::from(PENDING).fg(Color::Yellow),
                state => Text::from(state.to_string()).fg(Color::Gray),
            },
            SortKey::Partition => job.partition.clone().into(),
            SortKey::Name => job.name.clone().into(),
            SortKey::TimeUsed => right_align_text(format_duration(job.time_used_sec)),
            SortKey::TimeLimit => right_align_text(format_duration(job.time_limit_sec)),
            SortKey::TimeLeft => {
                if job.is_running() {
                    right_align_text(format_duration(job.time_left_sec))
                } else {
                    right_align_text("-")
                }
            }
        }
    }

    fn inner_state(&mut self) -> &mut TableState {
        &mut self.table
    }

    fn set_column_layout(&mut self, layout: Vec<(SortKey, u16, u16)>) {
        self.layout = layout;
    }
}

#[derive(Debug, Default)]
pub struct JobTable {}

impl JobTable {
    // Renders a simple notification that there are no displayable jobs
    fn render_empty_table(label: &str, area: Rect, buf: &mut Buffer) {
        // Size of label + surrounding border
        let width = label.chars().count() as u16 + 2;
        let height = 3;

        if let Some(area) = center_layout(area, width, height) {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_set(border::PLAIN);

            Text::from(label).render(block.inner(area), buf);
            block.render(area, buf);
        }
    }
}

impl StatefulWidgetRef for JobTable {
    type State = JobTableState;

    fn render_ref(&self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let table = GenericTable::<SortKey, JobTableState>::new();

        if state.is_empty() {
            // Keep the header visible so that the sort column can still be changed
            table.render_ref(area, buf, state);

            let [_, body] =
                Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);
            Self::render_empty_table(state.empty_message(), body, buf)
        } else {
            table.render_ref(area, buf, state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slurm::{RawJob, SlurmNumber};

    fn job(id: u64, state: &str, limit: Option<i64>) -> EnrichedJob {
        EnrichedJob::new(
            RawJob {
                job_id: id,
                user_name: "alice".into(),
                job_state: vec![state.into()],
                partition: "gpu".into(),
                name: "train".into(),
                start_time: Some(SlurmNumber::new(0)),
                submit_time: Some(SlurmNumber::new(0)),
                time_limit: limit.map(SlurmNumber::new),
            },
            3661,
        )
    }

    fn text(state: &JobTableState, row: usize, column: SortKey) -> String {
        state.text(row, column).to_string()
    }

    #[test]
    fn test_cells() {
        let jobs = [job(1, "RUNNING", Some(120)), job(2, "PENDING", None)];
        let mut state = JobTableState::default();
        state.update(&jobs.iter().collect::<Vec<_>>(), &ViewControls::default());

        assert_eq!(state.len(), 2);
        assert_eq!(text(&state, 0, SortKey::JobId), "1");
        assert_eq!(text(&state, 0, SortKey::JobState), "RUNNING");
        assert_eq!(text(&state, 0, SortKey::TimeUsed), "01:01:01");
        assert_eq!(text(&state, 0, SortKey::TimeLimit), "02:00:00");
        assert_eq!(text(&state, 0, SortKey::TimeLeft), "00:58:59");

        assert_eq!(text(&state, 1, SortKey::TimeUsed), "01:01:01");
        assert_eq!(text(&state, 1, SortKey::TimeLimit), "Infinite");
        assert_eq!(text(&state, 1, SortKey::TimeLeft), "-");
    }

    #[test]
    fn test_empty_message() {
        let mut state = JobTableState::default();
        state.update(&[], &ViewControls::default());
        assert!(state.is_empty());
        assert_eq!(state.empty_message(), "No jobs in the queue.");

        let mut controls = ViewControls::default();
        controls.set_filter("nobody");
        state.update(&[], &controls);
        assert_eq!(state.empty_message(), "No jobs match the filter.");
    }

    #[test]
    fn test_column_at() {
        let jobs = [job(1, "RUNNING", None)];
        let mut state = JobTableState::default();
        state.update(&jobs.iter().collect::<Vec<_>>(), &ViewControls::default());

        let area = Rect::new(0, 0, 120, 10);
        let mut buf = Buffer::empty(area);
        JobTable::default().render_ref(area, &mut buf, &mut state);

        assert_eq!(state.column_at(0), Some(SortKey::JobId));
        let (_, start, _) = state.layout[1];
        assert_eq!(state.column_at(start), Some(SortKey::UserName));
        assert_eq!(state.column_at(119), None);
    }
}
