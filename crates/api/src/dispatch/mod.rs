mod dispatch_due_event;

pub use dispatch_due_event::DispatchDueEventUseCase;
