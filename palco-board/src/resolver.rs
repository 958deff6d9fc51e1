use std::collections::HashMap;

use shared::WorkflowStage;

use crate::projection::Card;

/// Where a card landed, and whether the placement was a real match or the
/// first-stage fallback for a missing or stale workflow status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnAssignment<'a> {
    Matched(&'a WorkflowStage),
    Fallback {
        stage: &'a WorkflowStage,
        raw: Option<&'a str>,
    },
}

impl<'a> ColumnAssignment<'a> {
    pub fn stage(&self) -> &'a WorkflowStage {
        match self {
            ColumnAssignment::Matched(stage) => stage,
            ColumnAssignment::Fallback { stage, .. } => stage,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ColumnAssignment::Fallback { .. })
    }
}

/// Resolve a card's workflow status against the stage registry.
///
/// A status matches by exact, case-sensitive stage name. Anything else,
/// including `None`, lands in the first stage of the sorted registry. An
/// empty registry resolves nothing.
pub fn resolve_column<'a>(
    workflow_status: Option<&'a str>,
    stages: &'a [WorkflowStage],
) -> Option<ColumnAssignment<'a>> {
    let first = stages.first()?;
    match workflow_status {
        Some(status) => match stages.iter().find(|stage| stage.name == status) {
            Some(stage) => Some(ColumnAssignment::Matched(stage)),
            None => Some(ColumnAssignment::Fallback {
                stage: first,
                raw: Some(status),
            }),
        },
        None => Some(ColumnAssignment::Fallback {
            stage: first,
            raw: None,
        }),
    }
}

/// One rendered column: a stage and the cards assigned to it, in card order.
#[derive(Debug, Clone)]
pub struct BoardColumn<'a> {
    pub stage: &'a WorkflowStage,
    pub cards: Vec<&'a Card>,
}

/// Distribute cards over the stage registry. Column order follows the
/// registry; cards keep their input order within a column.
pub fn bucket_cards<'a>(stages: &'a [WorkflowStage], cards: &'a [Card]) -> Vec<BoardColumn<'a>> {
    let mut columns: Vec<BoardColumn<'a>> = stages
        .iter()
        .map(|stage| BoardColumn {
            stage,
            cards: Vec::new(),
        })
        .collect();
    let index_by_id: HashMap<i64, usize> = stages
        .iter()
        .enumerate()
        .map(|(index, stage)| (stage.id, index))
        .collect();

    for card in cards {
        if let Some(assignment) = resolve_column(card.workflow_status(), stages) {
            if let Some(&index) = index_by_id.get(&assignment.stage().id) {
                columns[index].cards.push(card);
            }
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::project_cards;
    use shared::{Application, ApplicationStatus, Campaign, Creator};

    fn stage(id: i64, name: &str, position: i32) -> WorkflowStage {
        WorkflowStage {
            id,
            company_id: 1,
            name: name.into(),
            position,
            color: None,
            is_default: position == 0,
        }
    }

    fn registry() -> Vec<WorkflowStage> {
        vec![
            stage(1, "Aceito", 0),
            stage(2, "Produção", 1),
            stage(3, "Entregue", 2),
        ]
    }

    #[test]
    fn exact_name_matches_its_stage() {
        let stages = registry();
        let assignment = resolve_column(Some("Produção"), &stages).unwrap();
        assert_eq!(assignment.stage().id, 2);
        assert!(!assignment.is_fallback());
    }

    #[test]
    fn stale_status_falls_back_to_first_stage() {
        let stages = registry();
        let assignment = resolve_column(Some("Revisao"), &stages).unwrap();
        assert_eq!(assignment.stage().position, 0);
        assert_eq!(
            assignment,
            ColumnAssignment::Fallback {
                stage: &stages[0],
                raw: Some("Revisao"),
            }
        );
    }

    #[test]
    fn missing_status_falls_back_to_first_stage() {
        let stages = registry();
        let assignment = resolve_column(None, &stages).unwrap();
        assert_eq!(assignment.stage().name, "Aceito");
        assert!(assignment.is_fallback());
    }

    #[test]
    fn empty_registry_resolves_nothing() {
        assert!(resolve_column(Some("Aceito"), &[]).is_none());
        assert!(resolve_column(None, &[]).is_none());
    }

    #[test]
    fn matching_is_case_sensitive() {
        let stages = registry();
        let assignment = resolve_column(Some("aceito"), &stages).unwrap();
        assert!(assignment.is_fallback());
    }

    #[test]
    fn fallback_tracks_whatever_registry_it_is_given() {
        let stages = registry();
        let first = resolve_column(Some("Revisao"), &stages).unwrap();
        let second = resolve_column(Some("Revisao"), &stages).unwrap();
        assert_eq!(first.stage().id, second.stage().id);

        let swapped = vec![stage(9, "Triagem", 0), stage(1, "Aceito", 1)];
        let third = resolve_column(Some("Revisao"), &swapped).unwrap();
        assert_eq!(third.stage().name, "Triagem");
    }

    fn card_fixture() -> Vec<Card> {
        let applications = vec![
            Application {
                id: 1,
                campaign_id: 10,
                creator_id: 100,
                status: ApplicationStatus::Accepted,
                workflow_status: None,
                creator_workflow_status: None,
                message: None,
                applied_at: None,
                metrics: None,
            },
            Application {
                id: 2,
                campaign_id: 10,
                creator_id: 100,
                status: ApplicationStatus::Accepted,
                workflow_status: Some("Produção".into()),
                creator_workflow_status: None,
                message: None,
                applied_at: None,
                metrics: None,
            },
            Application {
                id: 3,
                campaign_id: 10,
                creator_id: 100,
                status: ApplicationStatus::Accepted,
                workflow_status: Some("Revisao".into()),
                creator_workflow_status: None,
                message: None,
                applied_at: None,
                metrics: None,
            },
        ];
        project_cards(
            &applications,
            &[Campaign::placeholder(10)],
            &[Creator::placeholder(100)],
        )
    }

    #[test]
    fn bucketing_follows_registry_order() {
        let stages = registry();
        let cards = card_fixture();
        let columns = bucket_cards(&stages, &cards);

        assert_eq!(columns.len(), 3);
        let names: Vec<&str> = columns.iter().map(|c| c.stage.name.as_str()).collect();
        assert_eq!(names, vec!["Aceito", "Produção", "Entregue"]);

        // Null and stale statuses both land in the first column.
        let ids: Vec<i64> = columns[0].cards.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(columns[1].cards[0].id(), 2);
        assert!(columns[2].cards.is_empty());
    }

    #[test]
    fn empty_registry_buckets_no_columns() {
        let cards = card_fixture();
        assert!(bucket_cards(&[], &cards).is_empty());
    }
}
