use std::collections::HashMap;

mod class;
mod constant;
mod function;

pub use class::ClassChecker;
pub use constant::ConstantChecker;
pub use function::FunctionChecker;

/// Index entities by name the way the checkers look them up: iteration
/// follows the first occurrence of each name, while a duplicate name keeps
/// the later entity's data.
pub(super) fn index_last_wins<T, F>(items: Vec<T>, name_of: F) -> (Vec<String>, HashMap<String, T>)
where
    F: Fn(&T) -> &str,
{
    let mut order = Vec::with_capacity(items.len());
    let mut by_name = HashMap::with_capacity(items.len());
    for item in items {
        let name = name_of(&item).to_string();
        if !by_name.contains_key(&name) {
            order.push(name.clone());
        }
        by_name.insert(name, item);
    }
    (order, by_name)
}
