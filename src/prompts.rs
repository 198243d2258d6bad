pub const STORY_SYSTEM: &str = include_str!("../data/prompts/story_system.txt");
pub const STORY_USER: &str = include_str!("../data/prompts/story_user.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
