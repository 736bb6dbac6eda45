mod evaluate_due_items;

pub use evaluate_due_items::EvaluateDueItemsUseCase;
