/// Notifications raised by a session for outside observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseEvent {
    /// A toggle just completed the last open section of a week.
    WeekCompleted,
}

/// Events kept for observers before new ones are dropped.
pub const EVENT_BACKLOG: usize = 16;

/// Sending half given to the session; receivers are cloned out to observers.
pub type EventSender = crossbeam_channel::Sender<CourseEvent>;

/// Receiving half held by observers.
pub type EventReceiver = crossbeam_channel::Receiver<CourseEvent>;
