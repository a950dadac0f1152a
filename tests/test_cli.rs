use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn agentsmith() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("agentsmith"))
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

const VALID_AGENT: &str = r#"
id: code-reviewer
name: Code Reviewer
summary: Reviews code changes for defects and style issues
role: You are a meticulous code reviewer.
model:
  provider: anthropic
  family: claude
  tier: sonnet
tools:
  - id: read_file
    type: builtin
    description: Read a file from the repository
constraints:
  pii_policy: mask
  max_tokens: 8000
ownership:
  owner: platform@example.com
version: 1.2.0
tags: [engineering, review]
"#;

const BROKEN_AGENT: &str = r#"
id: Broken Agent
name: Broken
"#;

fn workspace(agents: &[(&str, &str)], recipes: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("agents")).unwrap();
    fs::create_dir_all(tmp.path().join("recipes")).unwrap();
    for (rel, content) in agents {
        write(tmp.path(), &format!("agents/{rel}"), content);
    }
    for (rel, content) in recipes {
        write(tmp.path(), &format!("recipes/{rel}"), content);
    }
    tmp
}

#[test]
fn test_help_output() {
    agentsmith()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Validate declarative agent specifications",
        ))
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_version_output() {
    agentsmith()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("agentsmith"));
}

#[test]
fn test_validate_passes_on_clean_workspace() {
    let tmp = workspace(&[("engineering/code-reviewer.yaml", VALID_AGENT)], &[]);

    agentsmith()
        .arg("validate")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("✓"))
        .stdout(predicate::str::contains("code-reviewer"))
        .stdout(predicate::str::contains("1 passed, 0 failed"));
}

#[test]
fn test_validate_reports_every_file_and_exits_nonzero() {
    let tmp = workspace(
        &[
            ("engineering/code-reviewer.yaml", VALID_AGENT),
            ("engineering/broken.yaml", BROKEN_AGENT),
        ],
        &[],
    );

    agentsmith()
        .arg("validate")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("✗"))
        // The valid sibling is still reported.
        .stdout(predicate::str::contains("code-reviewer"))
        .stdout(predicate::str::contains("1 passed, 1 failed"));
}

#[test]
fn test_validate_single_file() {
    let tmp = workspace(&[("engineering/code-reviewer.yaml", VALID_AGENT)], &[]);

    agentsmith()
        .args(["validate", "agents/engineering/code-reviewer.yaml"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 passed, 0 failed"));
}

#[test]
fn test_validate_recipe_with_unknown_agent_reference() {
    let recipe = r#"
id: release-review
name: Release Review
summary: Reviews a release end to end
graph:
  - stage: review
    sequence:
      - agent: nonexistent-agent
version: 1.0.0
"#;
    let tmp = workspace(&[("engineering/code-reviewer.yaml", VALID_AGENT)], &[(
        "release-review.yaml",
        recipe,
    )]);

    agentsmith()
        .arg("validate")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("unknown agent 'nonexistent-agent'"));
}

#[test]
fn test_render_claude_writes_markdown() {
    let tmp = workspace(&[("engineering/code-reviewer.yaml", VALID_AGENT)], &[]);

    agentsmith()
        .args(["render", "claude"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("code-reviewer.md"));

    let artifact = tmp.path().join("generated/claude/code-reviewer.md");
    let content = fs::read_to_string(artifact).unwrap();
    assert!(content.contains("name: code-reviewer"));
    assert!(content.contains("model: sonnet"));
    assert!(content.contains("You are a meticulous code reviewer."));
}

#[test]
fn test_render_langgraph_emits_support_files() {
    let tmp = workspace(&[("engineering/code-reviewer.yaml", VALID_AGENT)], &[]);

    agentsmith()
        .args(["render", "langgraph"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let out = tmp.path().join("generated/langgraph");
    assert!(out.join("code_reviewer_agent.py").is_file());
    assert!(out.join("requirements.txt").is_file());
    assert!(out.join("app.py").is_file());

    let requirements = fs::read_to_string(out.join("requirements.txt")).unwrap();
    assert!(requirements.contains("langchain-anthropic"));
}

#[test]
fn test_render_succeeds_with_recipes_in_the_workspace() {
    let recipe = r#"
id: release-review
name: Release Review
summary: Reviews a release end to end
graph:
  - stage: review
    sequence:
      - agent: code-reviewer
version: 1.0.0
"#;
    let tmp = workspace(&[("engineering/code-reviewer.yaml", VALID_AGENT)], &[(
        "release-review.yaml",
        recipe,
    )]);

    // Recipes are validated for cross-references but have no claude
    // template; they must not turn the render run into a failure.
    agentsmith()
        .args(["render", "claude"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("code-reviewer.md"))
        .stderr(predicate::str::contains("release-review").not());

    agentsmith()
        .args(["render", "langgraph"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let app = fs::read_to_string(tmp.path().join("generated/langgraph/app.py")).unwrap();
    assert!(app.contains("create_code_reviewer_agent"));
    assert!(!app.contains("release_review"));
}

#[test]
fn test_render_unknown_target_lists_available() {
    let tmp = workspace(&[("engineering/code-reviewer.yaml", VALID_AGENT)], &[]);

    agentsmith()
        .args(["render", "copilot"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("copilot"))
        .stderr(predicate::str::contains("claude"));
}

#[test]
fn test_render_single_agent_by_id() {
    let other = VALID_AGENT.replace("id: code-reviewer", "id: docs-writer");
    let tmp = workspace(
        &[
            ("engineering/code-reviewer.yaml", VALID_AGENT),
            ("engineering/docs-writer.yaml", &other),
        ],
        &[],
    );

    agentsmith()
        .args(["render", "claude", "--agent-id", "docs-writer"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let out = tmp.path().join("generated/claude");
    assert!(out.join("docs-writer.md").is_file());
    assert!(!out.join("code-reviewer.md").exists());
}

#[test]
fn test_render_missing_agent_id_fails() {
    let tmp = workspace(&[("engineering/code-reviewer.yaml", VALID_AGENT)], &[]);

    agentsmith()
        .args(["render", "claude", "--agent-id", "ghost"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("'ghost' not found"));
}

#[test]
fn test_render_skips_invalid_specifications() {
    let tmp = workspace(
        &[
            ("engineering/code-reviewer.yaml", VALID_AGENT),
            ("engineering/broken.yaml", BROKEN_AGENT),
        ],
        &[],
    );

    agentsmith()
        .args(["render", "claude"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("code-reviewer.md"))
        .stderr(predicate::str::contains("skipped"));

    // The valid agent was still rendered.
    assert!(tmp
        .path()
        .join("generated/claude/code-reviewer.md")
        .is_file());
}

#[test]
fn test_list_shows_workspace_contents() {
    let tmp = workspace(&[("engineering/code-reviewer.yaml", VALID_AGENT)], &[]);

    agentsmith()
        .arg("list")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("code-reviewer"))
        .stdout(predicate::str::contains("engineering"))
        .stdout(predicate::str::contains("1.2.0"))
        .stdout(predicate::str::contains("1 specification(s)"));
}

#[test]
fn test_list_filters_by_tag() {
    let other = VALID_AGENT
        .replace("id: code-reviewer", "id: docs-writer")
        .replace("tags: [engineering, review]", "tags: [docs]");
    let tmp = workspace(
        &[
            ("engineering/code-reviewer.yaml", VALID_AGENT),
            ("engineering/docs-writer.yaml", &other),
        ],
        &[],
    );

    agentsmith()
        .args(["list", "--tag", "docs"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("docs-writer"))
        .stdout(predicate::str::contains("code-reviewer").not());
}

#[test]
fn test_init_then_validate_round_trip() {
    let tmp = workspace(&[], &[]);

    agentsmith()
        .args([
            "init",
            "fresh-agent",
            "--owner",
            "owner@example.com",
            "--domain",
            "engineering",
        ])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("fresh-agent.yaml"));

    agentsmith()
        .arg("validate")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 passed, 0 failed"));
}

#[test]
fn test_init_refuses_existing_file() {
    let tmp = workspace(&[], &[]);

    agentsmith()
        .args(["init", "fresh-agent"])
        .current_dir(tmp.path())
        .assert()
        .success();

    agentsmith()
        .args(["init", "fresh-agent"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_templates_directory_is_skipped() {
    let tmp = workspace(
        &[
            ("engineering/code-reviewer.yaml", VALID_AGENT),
            ("_templates/starter.yaml", "not: valid"),
        ],
        &[],
    );

    agentsmith()
        .arg("validate")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 passed, 0 failed"));
}
