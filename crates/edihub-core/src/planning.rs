//! Sprint workflow on top of the storage traits.
//!
//! Completing a sprint touches both sprints and tasks: done tasks add
//! their `estimativa` to `pontos_concluidos`, and unfinished tasks can be
//! carried over to the next planned sprint.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::models::{
    Column, Sprint, SprintFilter, SprintStatus, SprintUpdate, TaskFilter, TaskUpdate,
};
use crate::store::{SprintStore, Store};

/// Outcome of [`complete_sprint`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SprintCompletion {
    #[serde(flatten)]
    pub sprint: Sprint,
    /// Sprint that received the unfinished tasks, if any.
    pub proxima_sprint_id: Option<i64>,
    pub tarefas_movidas: Vec<i64>,
}

/// The first sprint with status `ativa`, in backlog order.
pub async fn active_sprint<S>(store: &S) -> Result<Option<Sprint>>
where
    S: SprintStore + ?Sized,
{
    let active = store
        .list_sprints(&SprintFilter {
            status: Some(SprintStatus::Ativa),
            ..Default::default()
        })
        .await?;
    Ok(active.into_iter().next())
}

pub async fn start_sprint<S>(store: &S, id: i64) -> Result<Option<Sprint>>
where
    S: SprintStore + ?Sized,
{
    store
        .update_sprint(
            id,
            &SprintUpdate {
                status: Some(SprintStatus::Ativa),
                ..Default::default()
            },
        )
        .await
}

/// The planned sprint with the lowest `ordem` above `sprint`'s. When
/// `sprint` belongs to a project, only that project's sprints qualify.
pub async fn next_planned_sprint<S>(store: &S, sprint: &Sprint) -> Result<Option<Sprint>>
where
    S: SprintStore + ?Sized,
{
    let planned = store
        .list_sprints(&SprintFilter {
            projeto_id: sprint.projeto_id,
            status: Some(SprintStatus::Planejada),
        })
        .await?;
    Ok(planned
        .into_iter()
        .find(|s| s.id != sprint.id && s.ordem > sprint.ordem))
}

/// Marks the sprint `concluida` as of `today` and records the points of
/// its done tasks. With `move_tasks`, unfinished tasks are reassigned to
/// [`next_planned_sprint`]; they stay put when there is none.
///
/// Returns `Ok(None)` when the sprint does not exist.
pub async fn complete_sprint<S>(
    store: &S,
    id: i64,
    move_tasks: bool,
    today: NaiveDate,
) -> Result<Option<SprintCompletion>>
where
    S: Store + SprintStore + ?Sized,
{
    if store.get_sprint(id).await?.is_none() {
        return Ok(None);
    }

    let tasks = store
        .list_tasks(&TaskFilter {
            sprint_id: Some(id),
            limit: i64::MAX,
            ..Default::default()
        })
        .await?;
    let points: i64 = tasks
        .iter()
        .filter(|t| t.coluna == Column::Done)
        .filter_map(|t| t.estimativa)
        .sum();

    let update = SprintUpdate {
        status: Some(SprintStatus::Concluida),
        data_conclusao: Some(today),
        pontos_concluidos: Some(points),
        ..Default::default()
    };
    let Some(sprint) = store.update_sprint(id, &update).await? else {
        return Ok(None);
    };

    let mut moved = Vec::new();
    let mut next_id = None;
    if move_tasks {
        if let Some(next) = next_planned_sprint(store, &sprint).await? {
            let carry = TaskUpdate {
                sprint_id: Some(next.id),
                ..Default::default()
            };
            for task in tasks.iter().filter(|t| t.coluna != Column::Done) {
                if store.update_task(task.id, &carry).await?.is_some() {
                    moved.push(task.id);
                }
            }
            info!(sprint = id, next = next.id, moved = moved.len(), "carried over unfinished tasks");
            next_id = Some(next.id);
        }
    }

    Ok(Some(SprintCompletion {
        sprint,
        proxima_sprint_id: next_id,
        tarefas_movidas: moved,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewSprint, NewTask};
    use crate::store::memory::InMemoryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    fn sprint(nome: &str, projeto_id: Option<i64>, ordem: i64, status: SprintStatus) -> NewSprint {
        NewSprint {
            projeto_id,
            nome: nome.into(),
            objetivo: None,
            data_inicio: day(1),
            data_fim: day(14),
            status,
            meta_pontos: Some(10),
            ordem,
        }
    }

    async fn task_in(store: &InMemoryStore, sprint_id: i64, coluna: Column, pontos: i64) -> i64 {
        store
            .create_task(&NewTask {
                titulo: format!("{:?} {}", coluna, pontos),
                coluna,
                estimativa: Some(pontos),
                sprint_id: Some(sprint_id),
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_complete_sprint_records_points_and_carries_tasks() {
        let store = InMemoryStore::new();
        let current = store
            .create_sprint(&sprint("s1", Some(1), 1, SprintStatus::Ativa))
            .await
            .unwrap();
        // planned, but for another project
        store
            .create_sprint(&sprint("other", Some(2), 2, SprintStatus::Planejada))
            .await
            .unwrap();
        let later = store
            .create_sprint(&sprint("s3", Some(1), 5, SprintStatus::Planejada))
            .await
            .unwrap();
        let next = store
            .create_sprint(&sprint("s2", Some(1), 3, SprintStatus::Planejada))
            .await
            .unwrap();

        task_in(&store, current.id, Column::Done, 3).await;
        task_in(&store, current.id, Column::Done, 5).await;
        let open = task_in(&store, current.id, Column::InProgress, 8).await;

        let done = complete_sprint(&store, current.id, true, day(14))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(done.sprint.status, SprintStatus::Concluida);
        assert_eq!(done.sprint.data_conclusao, Some(day(14)));
        assert_eq!(done.sprint.pontos_concluidos, 8);
        assert_eq!(done.proxima_sprint_id, Some(next.id));
        assert_eq!(done.tarefas_movidas, vec![open]);

        let carried = store.get_task(open).await.unwrap().unwrap();
        assert_eq!(carried.sprint_id, Some(next.id));
        assert_ne!(carried.sprint_id, Some(later.id));
    }

    #[tokio::test]
    async fn test_complete_sprint_without_moving() {
        let store = InMemoryStore::new();
        let current = store
            .create_sprint(&sprint("s1", None, 1, SprintStatus::Ativa))
            .await
            .unwrap();
        store
            .create_sprint(&sprint("s2", None, 2, SprintStatus::Planejada))
            .await
            .unwrap();
        let open = task_in(&store, current.id, Column::Todo, 2).await;

        let done = complete_sprint(&store, current.id, false, day(14))
            .await
            .unwrap()
            .unwrap();
        assert!(done.tarefas_movidas.is_empty());
        assert_eq!(done.proxima_sprint_id, None);
        assert_eq!(
            store.get_task(open).await.unwrap().unwrap().sprint_id,
            Some(current.id)
        );
    }

    #[tokio::test]
    async fn test_complete_last_sprint_keeps_tasks() {
        let store = InMemoryStore::new();
        let current = store
            .create_sprint(&sprint("s1", None, 1, SprintStatus::Ativa))
            .await
            .unwrap();
        let open = task_in(&store, current.id, Column::Review, 2).await;

        let done = complete_sprint(&store, current.id, true, day(14))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(done.proxima_sprint_id, None);
        assert_eq!(
            store.get_task(open).await.unwrap().unwrap().sprint_id,
            Some(current.id)
        );
    }

    #[tokio::test]
    async fn test_complete_missing_sprint() {
        let store = InMemoryStore::new();
        assert!(complete_sprint(&store, 42, true, day(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_start_and_active_sprint() {
        let store = InMemoryStore::new();
        assert!(active_sprint(&store).await.unwrap().is_none());

        let s = store
            .create_sprint(&sprint("s1", None, 1, SprintStatus::Planejada))
            .await
            .unwrap();
        let started = start_sprint(&store, s.id).await.unwrap().unwrap();
        assert_eq!(started.status, SprintStatus::Ativa);
        assert_eq!(active_sprint(&store).await.unwrap().unwrap().id, s.id);
        assert!(start_sprint(&store, 99).await.unwrap().is_none());
    }
}
