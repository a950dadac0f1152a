use crate::config::Config;
use crate::error::Result;
use crate::loader;
use crate::project::Project;

pub fn execute(
    project: &Project,
    config: &Config,
    domain: Option<&str>,
    tag: Option<&str>,
) -> Result<()> {
    let mut documents = loader::load_workspace(
        &project.agents_dir(config),
        &project.recipes_dir(config),
    )?;

    if let Some(domain) = domain {
        documents.retain(|d| d.domain() == domain);
    }
    if let Some(tag) = tag {
        documents.retain(|d| d.tags().iter().any(|t| t == tag));
    }

    if documents.is_empty() {
        println!("No specifications found.");
        return Ok(());
    }

    documents.sort_by_key(|d| (d.domain(), d.id()));

    println!(
        "{:<8} {:<15} {:<28} {:<9} SUMMARY",
        "KIND", "DOMAIN", "ID", "VERSION"
    );
    println!("{}", "-".repeat(100));
    for document in &documents {
        println!(
            "{:<8} {:<15} {:<28} {:<9} {}",
            document.kind,
            document.domain(),
            document.id(),
            document.str_field("version").unwrap_or("-"),
            truncate(document.str_field("summary").unwrap_or(""), 40)
        );
    }
    println!();
    println!("{} specification(s)", documents.len());

    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate("reviews code", 40), "reviews code");
    }

    #[test]
    fn test_truncate_long_text_gets_ellipsis() {
        let long = "a".repeat(50);
        let out = truncate(&long, 40);
        assert_eq!(out.chars().count(), 40);
        assert!(out.ends_with("..."));
    }
}
