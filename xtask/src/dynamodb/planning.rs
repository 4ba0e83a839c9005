//! Pure functions for calculating deployment plans (Functional Core).

use super::config::TableConfig;

/// Represents the current state of a table.
#[derive(Debug, Clone)]
pub struct TableState {
    pub status: TableStatus,
    /// Key attribute names, hash key first.
    pub key_names: Vec<String>,
}

/// Table status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Active,
    Creating,
    Updating,
    Deleting,
}

/// Planned changes for deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployPlan {
    /// Table doesn't exist, needs to be created.
    CreateTable { config: TableConfig },
    /// Table exists with a different key schema. Deploy refuses to touch it.
    Incompatible {
        table_name: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    /// Table is up to date, no changes needed.
    NoChanges { table_name: String },
}

/// Plan for destroying a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestroyPlan {
    /// Table exists and will be deleted.
    DeleteTable { table_name: String },
    /// Table doesn't exist, nothing to do.
    AlreadyGone { table_name: String },
}

/// Calculate what changes are needed to reach the desired state.
pub fn calculate_deploy_plan(current: Option<&TableState>, desired: &TableConfig) -> DeployPlan {
    let Some(state) = current else {
        return DeployPlan::CreateTable {
            config: desired.clone(),
        };
    };

    let expected: Vec<String> = desired.key_names().iter().map(|s| s.to_string()).collect();
    if state.key_names == expected {
        DeployPlan::NoChanges {
            table_name: desired.table_name.clone(),
        }
    } else {
        DeployPlan::Incompatible {
            table_name: desired.table_name.clone(),
            expected,
            found: state.key_names.clone(),
        }
    }
}

pub fn calculate_destroy_plan(current: Option<&TableState>, table_name: &str) -> DestroyPlan {
    match current {
        Some(_) => DestroyPlan::DeleteTable {
            table_name: table_name.to_string(),
        },
        None => DestroyPlan::AlreadyGone {
            table_name: table_name.to_string(),
        },
    }
}

/// Format a deploy plan for display.
pub fn format_deploy_plan(plan: &DeployPlan) -> Vec<String> {
    match plan {
        DeployPlan::CreateTable { config } => vec![
            format!("+ Create table: {}", config.table_name),
            format!("  Partition key: {} (S)", config.partition_key.name),
            format!("  Sort key: {} (S)", config.sort_key.name),
            "  Billing: PAY_PER_REQUEST".to_string(),
        ],
        DeployPlan::Incompatible {
            table_name,
            expected,
            found,
        } => vec![
            format!("! Table '{}' exists with an incompatible key schema", table_name),
            format!("  expected: {}", expected.join(", ")),
            format!("  found:    {}", found.join(", ")),
        ],
        DeployPlan::NoChanges { table_name } => {
            vec![format!("= Table '{}' is up to date", table_name)]
        }
    }
}

pub fn format_destroy_plan(plan: &DestroyPlan) -> Vec<String> {
    match plan {
        DestroyPlan::DeleteTable { table_name } => {
            vec![format!(
                "- Delete table: {} (ALL DATA WILL BE LOST)",
                table_name
            )]
        }
        DestroyPlan::AlreadyGone { table_name } => {
            vec![format!("= Table '{}' does not exist", table_name)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamodb::config::campusboard_table_config;

    fn state(keys: &[&str]) -> TableState {
        TableState {
            status: TableStatus::Active,
            key_names: keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn test_missing_table_is_created() {
        let config = campusboard_table_config().with_table_name("forum-dev");
        let plan = calculate_deploy_plan(None, &config);

        assert_eq!(plan, DeployPlan::CreateTable { config });
        let lines = format_deploy_plan(&plan);
        assert_eq!(lines[0], "+ Create table: forum-dev");
        assert!(lines.iter().any(|l| l.contains("Sort key: SK")));
    }

    #[test]
    fn test_matching_table_needs_no_changes() {
        let config = campusboard_table_config();
        let plan = calculate_deploy_plan(Some(&state(&["PK", "SK"])), &config);

        assert_eq!(
            plan,
            DeployPlan::NoChanges {
                table_name: "campusboard".to_string()
            }
        );
    }

    #[test]
    fn test_foreign_key_schema_is_incompatible() {
        let config = campusboard_table_config();
        let plan = calculate_deploy_plan(Some(&state(&["id"])), &config);

        match plan {
            DeployPlan::Incompatible {
                expected, found, ..
            } => {
                assert_eq!(expected, vec!["PK", "SK"]);
                assert_eq!(found, vec!["id"]);
            }
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn test_destroy_plan() {
        assert_eq!(
            calculate_destroy_plan(Some(&state(&["PK", "SK"])), "campusboard"),
            DestroyPlan::DeleteTable {
                table_name: "campusboard".to_string()
            }
        );
        let gone = calculate_destroy_plan(None, "campusboard");
        assert_eq!(
            format_destroy_plan(&gone),
            vec!["= Table 'campusboard' does not exist"]
        );
    }
}
