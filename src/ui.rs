use std::rc::Rc;

use chrono::{DateTime, Local};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    prelude::Stylize,
    style::Color,
    symbols::{self, border},
    text::{Line, Span},
    widgets::{Block, Borders, StatefulWidgetRef, Widget},
};

use crate::{
    app::App,
    slurm::Snapshot,
    view::{SortKey, ViewControls},
    widgets::{
        JobTable, JobTableState, PartitionTable, PartitionTableState, UserTable, UserTableState,
    },
};

#[derive(Debug, Default, PartialEq, Eq)]
enum Focus {
    #[default]
    Jobs,
    Partitions,
}

#[derive(Debug, Default)]
pub struct UI {
    /// Indicates if the partition list or job list has focus
    focus: Focus,
    /// Are key presses appended to the filter text?
    editing_filter: bool,
    host: String,
    fetching: bool,
    error: Option<String>,
    loaded_at: Option<DateTime<Local>>,
    snapshot: Rc<Snapshot>,
    controls: ViewControls,
    partitions: PartitionTable,
    partition_state: PartitionTableState,
    users: UserTable,
    user_state: UserTableState,
    jobs: JobTable,
    job_state: JobTableState,
    /// The last used layouts; used to determine mouse-click targets
    partition_area: Rect,
    job_area: Rect,
}

impl UI {
    pub fn new(app: &App) -> Self {
        let mut ui = Self::default();
        ui.user_state.set_limit(app.args.top_users);
        ui.host = app.dashboard.host.clone();
        // Set initial focus on job list
        ui.set_focus(Focus::Jobs);
        // Fill out
        ui.update(app);
        ui
    }

    pub fn update(&mut self, app: &App) {
        let dashboard = &app.dashboard;

        self.fetching = app.is_fetching();
        self.error = dashboard.error().map(|v| v.to_string());
        self.loaded_at = dashboard.loaded_at();
        self.controls = dashboard.controls().clone();

        // All tables are rebuilt from the current snapshot
        self.snapshot = dashboard.snapshot();
        self.job_state.update(&dashboard.projected(), &self.controls);
        self.partition_state.update(&self.snapshot.partitions);
        self.user_state.update(&self.snapshot.summary);
    }

    pub fn scroll(&mut self, delta: isize) {
        match self.focus {
            Focus::Partitions => self.partition_state.scroll(delta),
            Focus::Jobs => self.job_state.scroll(delta),
        }
    }

    pub fn toggle_focus(&mut self) {
        self.set_focus(match self.focus {
            Focus::Jobs => Focus::Partitions,
            Focus::Partitions => Focus::Jobs,
        });
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.partition_state.focus(self.focus == Focus::Partitions);
        self.job_state.focus(self.focus == Focus::Jobs);
    }

    pub fn editing_filter(&self) -> bool {
        self.editing_filter
    }

    pub fn start_filter(&mut self) {
        self.editing_filter = true;
    }

    pub fn stop_filter(&mut self) {
        self.editing_filter = false;
    }

    /// Switches the list of top users between the whole cluster and each partition
    pub fn cycle_user_scope(&mut self) {
        self.user_state.cycle_scope(&self.snapshot.summary);
    }

    /// Handles a left click; returns the sort key if a column header of the job table was clicked
    pub fn mouse_click(&mut self, column: u16, row: u16) -> Option<SortKey> {
        if contains(self.job_area, column, row) {
            self.set_focus(Focus::Jobs);
            if row == self.job_area.y {
                return self.job_state.column_at(column);
            }

            // -1 for header
            self.job_state
                .click((row - self.job_area.y).saturating_sub(1) as usize);
        } else if contains(self.partition_area, column, row) {
            self.set_focus(Focus::Partitions);
            if row > self.partition_area.y {
                self.partition_state
                    .click((row - self.partition_area.y - 1) as usize);
            }
        }

        None
    }

    pub fn mouse_wheel(&mut self, column: u16, row: u16, delta: isize) {
        if contains(self.job_area, column, row) {
            self.job_state.scroll(delta)
        } else if contains(self.partition_area, column, row) {
            self.partition_state.scroll(delta)
        }
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        let top_height = self
            .partition_state
            .height()
            .max(self.user_state.height())
            // +1 for the top border
            .saturating_add(1);

        let [status, top, jobs] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Max(top_height.max(4)),
            Constraint::Min(4),
        ])
        .areas(area);

        let [partitions, users] =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                .areas(top);

        self.status_line().render(status, buf);
        self.render_partitions(partitions, buf);
        self.render_users(users, buf);
        self.render_jobs(jobs, buf);
    }

    fn status_line(&self) -> Line<'static> {
        let host = Span::from(format!(" {} ", self.host)).bold().reversed();

        let status = if self.fetching {
            Span::from(format!(" Fetching new data from {}...", self.host)).italic()
        } else if let Some(error) = &self.error {
            Span::from(format!(" Error fetching data: {}", error)).fg(Color::Red)
        } else if let Some(loaded_at) = self.loaded_at {
            Span::from(format!(
                " Data last updated: {}",
                loaded_at.format("%H:%M:%S")
            ))
        } else {
            Span::from(" No data yet")
        };

        Line::from(vec![host, status])
    }

    fn render_partitions(&mut self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title_top(Line::from(" Partitions ").bold().centered())
            .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
            .border_set(border::PLAIN);

        self.partition_area = block.inner(area);
        self.partitions
            .render_ref(self.partition_area, buf, &mut self.partition_state);
        block.render(area, buf);
    }

    fn render_users(&mut self, area: Rect, buf: &mut Buffer) {
        let summary = &self.snapshot.summary;
        let title = match self.user_state.scope() {
            Some(partition) => format!(" Jobs per user ({}) ", partition),
            None => " Jobs per user ".to_string(),
        };

        let stats = Line::from(vec![
            " Running ".into(),
            summary.running_count.to_string().bold().fg(Color::Green),
            " Pending ".into(),
            summary.pending_count.to_string().bold().fg(Color::Yellow),
            " Users ".into(),
            summary.unique_user_count.to_string().bold(),
            " ".into(),
        ])
        .right_aligned();

        let block = Block::default()
            .title_top(Line::from(title).bold().left_aligned())
            .title_top(stats)
            .borders(Borders::TOP | Borders::RIGHT)
            .border_set(border::PLAIN);

        self.users
            .render_ref(block.inner(area), buf, &mut self.user_state);
        block.render(area, buf);
    }

    fn render_jobs(&mut self, area: Rect, buf: &mut Buffer) {
        let title = format!(
            " Jobs ({} of {}) ",
            self.job_state.len(),
            self.snapshot.jobs.len()
        );

        // Join border with border-less bottom of the tables above
        let border = symbols::border::Set {
            top_left: symbols::line::NORMAL.vertical_right,
            top_right: symbols::line::NORMAL.vertical_left,
            ..symbols::border::PLAIN
        };

        let block = Block::default()
            .title_top(Line::from(title).centered())
            .title_bottom(self.instructions())
            .borders(Borders::ALL)
            .border_set(border);

        self.job_area = block.inner(area);
        self.jobs
            .render_ref(self.job_area, buf, &mut self.job_state);
        block.render(area, buf);
    }

    fn instructions(&self) -> Line<'static> {
        let filter = &self.controls.filter_text;

        if self.editing_filter {
            Line::from(vec![
                " Filter: ".bold(),
                Span::from(format!("{}█", filter)),
                " <Enter> ".bold(),
                "Done".into(),
                " <Ctrl-U> ".bold(),
                "Clear ".into(),
            ])
            .centered()
        } else {
            let mut spans = Vec::new();
            if !filter.is_empty() {
                spans.push(" Filter: ".bold());
                spans.push(Span::from(filter.clone()).fg(Color::Cyan));
            }

            spans.extend([
                " </> ".bold(),
                "Filter".into(),
                " <1-8> ".bold(),
                "Sort".into(),
                " <S> ".bold(),
                "Sort order".into(),
                " <P> ".bold(),
                "Users".into(),
                " <R> ".bold(),
                "Refresh".into(),
                " <Q> ".bold(),
                "Quit ".into(),
            ]);

            Line::from(spans).centered()
        }
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    !area.is_empty()
        && column >= area.x
        && column < area.right()
        && row >= area.y
        && row < area.bottom()
}
