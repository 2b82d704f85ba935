use std::sync::Arc;

use fiddy_core::forms::{Mood, PreferenceForm};
use fiddy_core::{
    ChatSession, Config, ModuleKind, Notice, NoticeSink, NutritionForm, PlanRequestWorkflow,
    QuickAction, RemoteError, TextGenerator, WorkoutForm,
};
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;
use tracing::debug;

/// How long a notice stays on screen, in ticks (300ms each)
pub const NOTICE_TICKS: u8 = 14;

type RemoteTask = JoinHandle<Result<String, RemoteError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Nutrition,
    Workout,
    Companion,
}

impl Screen {
    pub fn for_module(kind: ModuleKind) -> Self {
        match kind {
            ModuleKind::Nutrition => Screen::Nutrition,
            ModuleKind::Workout => Screen::Workout,
            ModuleKind::Companion => Screen::Companion,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone)]
pub struct ActiveNotice {
    pub notice: Notice,
    pub ticks_left: u8,
}

/// Spawn one generation call on the runtime
fn spawn_generate(generator: &Arc<dyn TextGenerator>, prompt: String) -> RemoteTask {
    let generator = Arc::clone(generator);
    tokio::spawn(async move { generator.generate(&prompt).await })
}

async fn join_task(task: RemoteTask) -> Result<String, RemoteError> {
    match task.await {
        Ok(result) => result,
        Err(e) => Err(RemoteError::TaskFailed(e.to_string())),
    }
}

/// A plan-producing module: its workflow plus the cursor and the
/// outstanding request, if any
pub struct PlanModule<F: PreferenceForm> {
    pub workflow: PlanRequestWorkflow<F>,
    /// Field under the cursor; `fields().len()` is the Generate button
    pub field: usize,
    /// Highlighted option within the current field
    pub option: usize,
    pub plan_scroll: u16,
    pub task: Option<RemoteTask>,
}

impl<F: PreferenceForm> PlanModule<F> {
    pub fn new() -> Self {
        Self {
            workflow: PlanRequestWorkflow::new(),
            field: 0,
            option: 0,
            plan_scroll: 0,
            task: None,
        }
    }

    pub fn field_count(&self) -> usize {
        self.workflow.form().fields().len()
    }

    pub fn on_generate_button(&self) -> bool {
        self.field >= self.field_count()
    }

    fn reset_option_cursor(&mut self) {
        self.option = self
            .workflow
            .form()
            .fields()
            .get(self.field)
            .and_then(|f| f.chosen.first().copied())
            .unwrap_or(0);
    }

    pub fn field_down(&mut self) {
        self.field = (self.field + 1).min(self.field_count());
        self.reset_option_cursor();
    }

    pub fn field_up(&mut self) {
        self.field = self.field.saturating_sub(1);
        self.reset_option_cursor();
    }

    pub fn option_next(&mut self) {
        if let Some(field) = self.workflow.form().fields().get(self.field) {
            if !field.options.is_empty() {
                self.option = (self.option + 1) % field.options.len();
            }
        }
    }

    pub fn option_prev(&mut self) {
        if let Some(field) = self.workflow.form().fields().get(self.field) {
            let len = field.options.len();
            if len > 0 {
                self.option = (self.option + len - 1) % len;
            }
        }
    }

    /// Select (or toggle) the highlighted option
    pub fn choose(&mut self) {
        if let Some(edit) = F::edit_for(self.field, self.option) {
            self.workflow.edit(edit);
        }
    }

    /// Start a request. Returns a notice when the attempt is refused.
    pub fn submit(&mut self, generator: &Arc<dyn TextGenerator>, detailed: bool) -> Option<Notice> {
        match self.workflow.begin() {
            Ok(prompt) => {
                self.task = Some(spawn_generate(generator, prompt));
                None
            }
            Err(e) => Notice::for_submit_error(F::MODULE, &e, detailed),
        }
    }

    /// Collect a finished request, if there is one
    pub async fn poll(&mut self, detailed: bool) -> Option<Notice> {
        if !self.task.as_ref().is_some_and(|t| t.is_finished()) {
            return None;
        }
        let task = self.task.take()?;
        let result = join_task(task).await;

        match self.workflow.finish(result) {
            Ok(_) => {
                self.plan_scroll = 0;
                Some(Notice::success(F::MODULE))
            }
            Err(e) => Some(Notice::remote_failure(F::MODULE, &e, detailed)),
        }
    }

    /// Leaving the module drops the form, the plan, and any outstanding
    /// request's result
    pub fn leave(&mut self) {
        if self.task.take().is_some() {
            debug!(module = F::MODULE.as_str(), "leave: discarding in-flight request");
        }
        *self = Self::new();
    }
}

impl<F: PreferenceForm> Default for PlanModule<F> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ChatModule {
    pub session: ChatSession,
    pub cursor: usize, // char index into the draft
    pub mood_cursor: usize,
    pub scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,
    pub task: Option<RemoteTask>,
    history_turns: usize,
}

impl ChatModule {
    pub fn new(history_turns: usize) -> Self {
        Self {
            session: ChatSession::new(history_turns),
            cursor: 0,
            mood_cursor: 0,
            scroll: 0,
            chat_height: 0,
            chat_width: 0,
            task: None,
            history_turns,
        }
    }

    /// Choose the highlighted mood; choosing it again clears the mood
    pub fn pick_mood(&mut self) {
        let highlighted = Mood::ALL.get(self.mood_cursor).copied();
        if self.session.mood() == highlighted {
            self.session.set_mood(None);
        } else {
            self.session.set_mood(highlighted);
        }
    }

    pub fn send(
        &mut self,
        generator: &Arc<dyn TextGenerator>,
        text: Option<&str>,
        detailed: bool,
    ) -> Option<Notice> {
        match self.session.begin_send(text) {
            Ok(prompt) => {
                self.cursor = 0;
                self.task = Some(spawn_generate(generator, prompt));
                self.scroll_to_bottom();
                None
            }
            Err(e) => Notice::for_submit_error(ModuleKind::Companion, &e, detailed),
        }
    }

    pub fn quick_action(
        &mut self,
        action: QuickAction,
        generator: &Arc<dyn TextGenerator>,
        detailed: bool,
    ) -> Option<Notice> {
        self.send(generator, Some(action.message()), detailed)
    }

    pub async fn poll(&mut self, detailed: bool) -> Option<Notice> {
        if !self.task.as_ref().is_some_and(|t| t.is_finished()) {
            return None;
        }
        let task = self.task.take()?;
        let result = join_task(task).await;

        let notice = match self.session.finish(result) {
            Ok(_) => None,
            Err(e) => Some(Notice::remote_failure(ModuleKind::Companion, &e, detailed)),
        };
        self.scroll_to_bottom();
        notice
    }

    /// Scroll so the newest message (or the typing indicator) is visible
    pub fn scroll_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 { self.chat_width as usize } else { 50 };

        let mut total_lines: usize = 0;
        for msg in self.session.messages() {
            total_lines += 1; // "You · 10:42" header
            for line in msg.body.lines() {
                let chars = line.chars().count();
                total_lines += chars / wrap_width + 1;
            }
            total_lines += 1;
        }
        if self.session.is_in_flight() {
            total_lines += 2;
        }

        // ratatui scroll offsets are u16; a longer history pins to the end
        let total_lines = u16::try_from(total_lines).unwrap_or(u16::MAX);
        let visible = if self.chat_height > 0 { self.chat_height } else { 20 };
        self.scroll = total_lines.saturating_sub(visible);
    }

    pub fn leave(&mut self) {
        if self.task.take().is_some() {
            debug!("leave: discarding in-flight companion request");
        }
        *self = Self::new(self.history_turns);
    }
}

pub struct App {
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub home_state: ListState,

    pub nutrition: PlanModule<NutritionForm>,
    pub workout: PlanModule<WorkoutForm>,
    pub chat: ChatModule,

    pub notice: Option<ActiveNotice>,
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub generator: Arc<dyn TextGenerator>,
    pub model: String,
    pub has_credential: bool,
    pub detailed_errors: bool,
    pub show_sample_charts: bool,
}

impl App {
    pub fn new(config: &Config, generator: Arc<dyn TextGenerator>) -> Self {
        let mut home_state = ListState::default();
        home_state.select(Some(0));

        Self {
            should_quit: false,
            screen: Screen::Home,
            input_mode: InputMode::Normal,
            home_state,

            nutrition: PlanModule::new(),
            workout: PlanModule::new(),
            chat: ChatModule::new(config.chat_history_turns()),

            notice: None,
            animation_frame: 0,

            generator,
            model: config.model().to_string(),
            has_credential: config.resolve_api_key().is_some(),
            detailed_errors: config.detailed_errors,
            show_sample_charts: config.show_sample_charts(),
        }
    }

    pub fn home_nav_down(&mut self) {
        let len = ModuleKind::all().len();
        let i = self.home_state.selected().unwrap_or(0);
        self.home_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn home_nav_up(&mut self) {
        let i = self.home_state.selected().unwrap_or(0);
        self.home_state.select(Some(i.saturating_sub(1)));
    }

    pub fn open_selected_module(&mut self) {
        let modules = ModuleKind::all();
        if let Some(kind) = self.home_state.selected().and_then(|i| modules.get(i)) {
            self.open_module(*kind);
        }
    }

    /// Switch to a module screen and keep the landing list selection in step
    pub fn open_module(&mut self, kind: ModuleKind) {
        debug!(module = kind.as_str(), "open_module");
        if let Some(index) = ModuleKind::all().iter().position(|k| *k == kind) {
            self.home_state.select(Some(index));
        }
        self.screen = Screen::for_module(kind);
        self.input_mode = InputMode::Normal;
    }

    /// Return to the landing screen; the module being left starts over
    pub fn leave_module(&mut self) {
        match self.screen {
            Screen::Nutrition => self.nutrition.leave(),
            Screen::Workout => self.workout.leave(),
            Screen::Companion => self.chat.leave(),
            Screen::Home => {}
        }
        self.screen = Screen::Home;
        self.input_mode = InputMode::Normal;
    }

    pub fn is_loading(&self) -> bool {
        match self.screen {
            Screen::Nutrition => self.nutrition.workflow.is_in_flight(),
            Screen::Workout => self.workout.workflow.is_in_flight(),
            Screen::Companion => self.chat.session.is_in_flight(),
            Screen::Home => false,
        }
    }

    pub fn submit_current(&mut self) {
        let notice = match self.screen {
            Screen::Nutrition => self.nutrition.submit(&self.generator, self.detailed_errors),
            Screen::Workout => self.workout.submit(&self.generator, self.detailed_errors),
            Screen::Companion => self.chat.send(&self.generator, None, self.detailed_errors),
            Screen::Home => None,
        };
        if let Some(n) = notice {
            self.notify(n);
        }
    }

    pub fn quick_action(&mut self, action: QuickAction) {
        if let Some(n) = self.chat.quick_action(action, &self.generator, self.detailed_errors) {
            self.notify(n);
        }
    }

    /// Collect finished requests from every module
    pub async fn poll_tasks(&mut self) {
        let detailed = self.detailed_errors;
        let mut notices = Vec::new();
        notices.extend(self.nutrition.poll(detailed).await);
        notices.extend(self.workout.poll(detailed).await);
        notices.extend(self.chat.poll(detailed).await);
        for n in notices {
            self.notify(n);
        }
    }

    /// Tick animation and notice expiry (called by Tick event)
    pub fn tick(&mut self) {
        if self.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        if let Some(active) = &mut self.notice {
            active.ticks_left = active.ticks_left.saturating_sub(1);
            if active.ticks_left == 0 {
                self.notice = None;
            }
        }
    }
}

impl NoticeSink for App {
    fn notify(&mut self, notice: Notice) {
        debug!(title = %notice.title, severity = ?notice.severity, "notify");
        self.notice = Some(ActiveNotice {
            notice,
            ticks_left: NOTICE_TICKS,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fiddy_core::forms::{DietType, FitnessGoal, NutritionEdit, TrainingStyle};
    use fiddy_core::state::GREETING;
    use fiddy_core::Severity;

    /// Replies with a fixed string, or fails when empty
    struct Echo(&'static str);

    #[async_trait]
    impl TextGenerator for Echo {
        async fn generate(&self, _prompt: &str) -> Result<String, RemoteError> {
            if self.0.is_empty() {
                Err(RemoteError::NetworkUnavailable("offline".to_string()))
            } else {
                Ok(self.0.to_string())
            }
        }
    }

    fn app_with(reply: &'static str) -> App {
        App::new(&Config::new(), Arc::new(Echo(reply)))
    }

    async fn wait_for_tasks(app: &mut App) {
        for _ in 0..100 {
            app.poll_tasks().await;
            if app.nutrition.task.is_none() && app.workout.task.is_none() && app.chat.task.is_none() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("tasks did not finish");
    }

    fn fill_nutrition(app: &mut App) {
        let wf = &mut app.nutrition.workflow;
        wf.edit(NutritionEdit::DietType(DietType::Vegan));
        wf.edit(NutritionEdit::FitnessGoal(FitnessGoal::EnergyBoost));
        wf.edit(NutritionEdit::WorkoutType(TrainingStyle::Yoga));
    }

    #[tokio::test]
    async fn test_incomplete_form_shows_missing_notice() {
        let mut app = app_with("plan");
        app.screen = Screen::Nutrition;
        app.submit_current();

        let notice = &app.notice.as_ref().unwrap().notice;
        assert_eq!(notice.title, "Missing Information");
        assert!(app.nutrition.task.is_none());
    }

    #[tokio::test]
    async fn test_submit_then_poll_publishes_plan() {
        let mut app = app_with("Eat greens");
        app.screen = Screen::Nutrition;
        fill_nutrition(&mut app);

        app.submit_current();
        assert!(app.is_loading());
        wait_for_tasks(&mut app).await;

        assert!(!app.is_loading());
        assert_eq!(app.nutrition.workflow.plan().unwrap().as_str(), "Eat greens");
        assert_eq!(app.notice.as_ref().unwrap().notice.severity, Severity::Success);
    }

    #[tokio::test]
    async fn test_failed_request_shows_generic_error() {
        let mut app = app_with("");
        app.screen = Screen::Nutrition;
        fill_nutrition(&mut app);

        app.submit_current();
        wait_for_tasks(&mut app).await;

        let notice = &app.notice.as_ref().unwrap().notice;
        assert_eq!(notice.description, "Failed to generate diet plan. Please try again.");
        assert!(app.nutrition.workflow.plan().is_none());
    }

    #[tokio::test]
    async fn test_leave_module_discards_plan() {
        let mut app = app_with("plan");
        app.screen = Screen::Nutrition;
        fill_nutrition(&mut app);
        app.submit_current();
        wait_for_tasks(&mut app).await;

        app.leave_module();
        assert_eq!(app.screen, Screen::Home);
        assert!(app.nutrition.workflow.plan().is_none());
    }

    #[tokio::test]
    async fn test_choose_toggles_multi_select() {
        let mut app = app_with("plan");
        app.nutrition.field = 1; // allergies
        app.nutrition.option = 2;
        app.nutrition.choose();
        assert_eq!(app.nutrition.workflow.form().allergies.len(), 1);
        app.nutrition.choose();
        assert!(app.nutrition.workflow.form().allergies.is_empty());
    }

    #[tokio::test]
    async fn test_option_cursor_wraps() {
        let mut app = app_with("plan");
        app.workout.field = 0;
        app.workout.option_prev();
        assert_eq!(app.workout.option, 4);
        app.workout.option_next();
        assert_eq!(app.workout.option, 0);
    }

    #[tokio::test]
    async fn test_quick_action_appends_reply() {
        let mut app = app_with("Breathe in for four");
        app.screen = Screen::Companion;
        app.quick_action(QuickAction::Breathing);
        wait_for_tasks(&mut app).await;

        let msgs = app.chat.session.messages();
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[2].body, "Breathe in for four");
    }

    #[test]
    fn test_open_module_selects_landing_entry() {
        let mut app = app_with("plan");
        app.open_module(ModuleKind::Companion);
        assert_eq!(app.screen, Screen::Companion);
        assert_eq!(app.home_state.selected(), Some(2));

        app.leave_module();
        app.open_selected_module();
        assert_eq!(app.screen, Screen::Companion);
    }

    #[test]
    fn test_scroll_to_bottom_counts_wrapped_lines() {
        let mut chat = ChatModule::new(0);
        chat.chat_width = 10;
        chat.chat_height = 5;
        *chat.session.draft_mut() = "x".repeat(25);
        chat.session.begin_send(None).unwrap();
        chat.scroll_to_bottom();

        // greeting: header + wrapped body + gap; user turn: 1 + 3 + 1; typing: 2
        let greeting = GREETING.chars().count() / 10 + 1;
        let total = (1 + greeting + 1) + 5 + 2;
        assert_eq!(chat.scroll as usize, total - 5);
    }

    #[test]
    fn test_scroll_to_bottom_clamps_long_history() {
        let mut chat = ChatModule::new(0);
        chat.chat_width = 1;
        chat.chat_height = 10;
        *chat.session.draft_mut() = "x".repeat(70_000);
        chat.session.begin_send(None).unwrap();
        chat.scroll_to_bottom();

        assert_eq!(chat.scroll, u16::MAX - 10);
    }

    #[test]
    fn test_notice_expires_after_ticks() {
        let mut app = app_with("plan");
        app.notify(Notice::success(ModuleKind::Workout));
        for _ in 0..NOTICE_TICKS {
            assert!(app.notice.is_some());
            app.tick();
        }
        assert!(app.notice.is_none());
    }
}
