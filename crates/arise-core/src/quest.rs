use contracts::Quest;

/// Completion predicate: every task at or past its goal. A quest with no
/// tasks never counts as completed.
pub fn quest_completed(quest: &Quest) -> bool {
    !quest.tasks.is_empty() && quest.tasks.iter().all(|task| task.current >= task.goal)
}

/// Set the matching task's progress to `progress` and recompute the owning
/// quest's completion flag. Quests not matching `quest_id` pass through
/// untouched; an unknown `quest_id` leaves the whole list unchanged.
/// Progress is stored as given, without clamping to the goal.
pub fn apply_task_progress(
    quests: &[Quest],
    quest_id: &str,
    task_id: &str,
    progress: f64,
) -> Vec<Quest> {
    quests
        .iter()
        .map(|quest| {
            if quest.id != quest_id {
                return quest.clone();
            }

            let mut updated = quest.clone();
            for task in &mut updated.tasks {
                if task.id == task_id {
                    task.current = progress;
                }
            }
            updated.is_completed = quest_completed(&updated);
            updated
        })
        .collect()
}

/// Recompute the derived completion flag on every quest. Applied to any
/// quest list that enters the system from outside, so the flag always
/// reflects the task list rather than whatever the caller sent.
pub fn normalize(quests: Vec<Quest>) -> Vec<Quest> {
    quests
        .into_iter()
        .map(|mut quest| {
            quest.is_completed = quest_completed(&quest);
            quest
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::QuestTask;

    fn sample_quests() -> Vec<Quest> {
        vec![
            Quest {
                id: "daily".to_string(),
                title: "DAILY TRAINING".to_string(),
                tasks: vec![
                    QuestTask {
                        id: "push-ups".to_string(),
                        name: "PUSH-UPS".to_string(),
                        goal: 10.0,
                        current: 9.0,
                        unit: String::new(),
                    },
                    QuestTask {
                        id: "run".to_string(),
                        name: "RUN".to_string(),
                        goal: 5.0,
                        current: 5.0,
                        unit: "KM".to_string(),
                    },
                ],
                is_completed: false,
            },
            Quest {
                id: "weekly".to_string(),
                title: "WEEKLY GOALS".to_string(),
                tasks: vec![QuestTask {
                    id: "read".to_string(),
                    name: "READ".to_string(),
                    goal: 3.0,
                    current: 0.0,
                    unit: "CHAPTERS".to_string(),
                }],
                is_completed: false,
            },
        ]
    }

    #[test]
    fn reaching_the_goal_completes_the_quest() {
        let updated = apply_task_progress(&sample_quests(), "daily", "push-ups", 10.0);
        assert_eq!(updated[0].tasks[0].current, 10.0);
        assert!(updated[0].is_completed);
    }

    #[test]
    fn partial_progress_leaves_quest_incomplete() {
        let updated = apply_task_progress(&sample_quests(), "daily", "push-ups", 3.0);
        assert_eq!(updated[0].tasks[0].current, 3.0);
        assert!(!updated[0].is_completed);
    }

    #[test]
    fn progress_is_not_clamped_to_the_goal() {
        let updated = apply_task_progress(&sample_quests(), "daily", "push-ups", 40.0);
        assert_eq!(updated[0].tasks[0].current, 40.0);
        assert!(updated[0].is_completed);
    }

    #[test]
    fn unknown_quest_id_passes_the_list_through() {
        let quests = sample_quests();
        let updated = apply_task_progress(&quests, "missing", "push-ups", 10.0);
        assert_eq!(updated, quests);
    }

    #[test]
    fn other_quests_and_ordering_are_preserved() {
        let quests = sample_quests();
        let updated = apply_task_progress(&quests, "daily", "push-ups", 10.0);
        assert_eq!(updated.len(), 2);
        assert_eq!(updated[1], quests[1]);
        assert_eq!(updated[0].tasks[1], quests[0].tasks[1]);
    }

    #[test]
    fn zero_task_quest_is_never_completed() {
        let quest = Quest {
            id: "empty".to_string(),
            title: "EMPTY".to_string(),
            tasks: Vec::new(),
            is_completed: false,
        };
        assert!(!quest_completed(&quest));

        let normalized = normalize(vec![Quest {
            is_completed: true,
            ..quest
        }]);
        assert!(!normalized[0].is_completed);
    }

    #[test]
    fn normalize_overrides_caller_supplied_flags() {
        let mut quests = sample_quests();
        quests[0].is_completed = true;
        quests[1].tasks[0].current = 3.0;

        let normalized = normalize(quests);
        assert!(!normalized[0].is_completed);
        assert!(normalized[1].is_completed);
    }
}
