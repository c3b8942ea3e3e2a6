//! Cross-field business rules for habit records.
//!
//! Rules run in a fixed order and the first broken one is reported. The
//! referenced habit is resolved once through a [`Lookup`] before the rules
//! run, so the rule table itself stays a pure function of its input.

use serde::Deserialize;
use thiserror::Error;

use crate::prelude::*;

pub const DURATION_RANGE: std::ops::RangeInclusive<i32> = 1..=120;
pub const FREQUENCY_RANGE: std::ops::RangeInclusive<i32> = 1..=7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Violation {
  #[error("Choose one: a reward or a related habit, not both")]
  RewardAndRelatedConflict,
  #[error("A pleasant habit cannot have a reward or a related habit")]
  PleasantHabitHasRewardOrLink,
  #[error("Related habit does not exist")]
  RelatedHabitNotFound,
  #[error("Related habit must be pleasant")]
  RelatedHabitNotPleasant,
  #[error("A habit cannot be related to itself")]
  SelfReference,
  #[error("Duration must be between 1 and 120 seconds")]
  DurationOutOfRange,
  #[error("Frequency must be between 1 and 7 days")]
  FrequencyOutOfRange,
  /// Raised by the update path, not by the rule table.
  #[error("Habit is linked from other habits and must stay pleasant")]
  PleasantHabitInUse,
}

/// Candidate habit record, without its owner.
#[derive(Debug, Clone, Deserialize)]
pub struct Draft {
  /// Set on the update path only.
  #[serde(skip)]
  pub id: Option<i32>,
  pub place: String,
  pub time: NaiveTime,
  pub action: String,
  #[serde(default)]
  pub is_pleasant: bool,
  #[serde(default, rename = "related_habit")]
  pub related_habit_id: Option<i32>,
  #[serde(default = "default_frequency")]
  pub frequency: i32,
  #[serde(default)]
  pub reward: Option<String>,
  pub duration: i32,
  #[serde(default)]
  pub is_public: bool,
}

fn default_frequency() -> i32 {
  1
}

impl Draft {
  /// Blank rewards count as absent.
  pub fn reward(&self) -> Option<&str> {
    self.reward.as_deref().map(str::trim).filter(|r| !r.is_empty())
  }
}

/// State of the habit referenced by `related_habit_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Related {
  None,
  Missing,
  Pleasant,
  Unpleasant,
}

/// Read access to stored habits, needed by the related-habit rules.
#[async_trait]
pub trait Lookup: Sync {
  /// `is_pleasant` flag of habit `id`, or `None` if it does not exist.
  async fn is_pleasant(&self, id: i32) -> Result<Option<bool>>;
}

type Rule = fn(&Draft, Related) -> bool;

const RULES: &[(Violation, Rule)] = &[
  (Violation::RewardAndRelatedConflict, reward_and_related),
  (Violation::PleasantHabitHasRewardOrLink, pleasant_with_reward_or_link),
  (Violation::RelatedHabitNotFound, related_missing),
  (Violation::RelatedHabitNotPleasant, related_unpleasant),
  (Violation::SelfReference, self_reference),
  (Violation::DurationOutOfRange, duration_out_of_range),
  (Violation::FrequencyOutOfRange, frequency_out_of_range),
];

fn reward_and_related(draft: &Draft, _: Related) -> bool {
  draft.reward().is_some() && draft.related_habit_id.is_some()
}

fn pleasant_with_reward_or_link(draft: &Draft, _: Related) -> bool {
  draft.is_pleasant
    && (draft.reward().is_some() || draft.related_habit_id.is_some())
}

fn related_missing(_: &Draft, related: Related) -> bool {
  related == Related::Missing
}

fn related_unpleasant(_: &Draft, related: Related) -> bool {
  related == Related::Unpleasant
}

fn self_reference(draft: &Draft, _: Related) -> bool {
  matches!((draft.id, draft.related_habit_id), (Some(id), Some(rel)) if id == rel)
}

fn duration_out_of_range(draft: &Draft, _: Related) -> bool {
  !DURATION_RANGE.contains(&draft.duration)
}

fn frequency_out_of_range(draft: &Draft, _: Related) -> bool {
  !FREQUENCY_RANGE.contains(&draft.frequency)
}

/// Runs the rule table against an already resolved related habit.
pub fn check(draft: &Draft, related: Related) -> Result<(), Violation> {
  match RULES.iter().find(|(_, broken)| broken(draft, related)) {
    Some((violation, _)) => Err(*violation),
    None => Ok(()),
  }
}

pub async fn validate<L>(draft: &Draft, lookup: &L) -> Result<()>
where
  L: Lookup + ?Sized,
{
  let related = match draft.related_habit_id {
    None => Related::None,
    Some(id) => match lookup.is_pleasant(id).await? {
      None => Related::Missing,
      Some(true) => Related::Pleasant,
      Some(false) => Related::Unpleasant,
    },
  };

  check(draft, related)?;
  Ok(())
}
