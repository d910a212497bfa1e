/// The instruction template used for recipe recommendations.
///
/// Loaded from `recipe_prompt.txt` at compile time using the `include_str!`
/// macro, making it easy to edit without dealing with Rust string syntax.
///
/// Contains an `{{INGREDIENTS}}` placeholder that is replaced with the
/// comma-joined ingredient names by [`build_recipe_prompt`].
pub const RECIPE_PROMPT_TEMPLATE: &str = include_str!("recipe_prompt.txt");

/// Render the recipe prompt for the given ingredients.
///
/// Names are joined verbatim; nothing is escaped since the result is prose.
pub fn build_recipe_prompt<S: AsRef<str>>(ingredients: &[S]) -> String {
    let joined = ingredients
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(", ");
    RECIPE_PROMPT_TEMPLATE.replace("{{INGREDIENTS}}", &joined)
}
