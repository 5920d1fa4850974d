//! Meeting minutes stored as custom work-item fields.
//!
//! Azure DevOps has no notion of minutes; the process template adds custom
//! fields to the work item type and this module maps between those fields and
//! the shape the UI edits.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::datetime::{date_to_utc, local_to_utc, utc_to_date, utc_to_local};
use crate::AtaError;

pub const FIELD_TITLE: &str = "System.Title";
pub const FIELD_STATE: &str = "System.State";
pub const FIELD_LOCATION: &str = "Custom.Local";
pub const FIELD_START: &str = "Custom.DataHoraInicio";
pub const FIELD_FINISH: &str = "Custom.DataHoraFim";
pub const FIELD_SUBJECT: &str = "Custom.Assunto";
pub const FIELD_COMMENTS: &str = "Custom.Comentarios";

/// Number of action/responsible/date triples the work item type carries.
pub const NEXT_STEP_SLOTS: usize = 10;

/// Reference names of the three fields backing next-step slot `n` (1-based).
pub fn next_step_fields(n: usize) -> [String; 3] {
    [
        format!("Custom.ProximoPasso{n}"),
        format!("Custom.Responsavel{n}"),
        format!("Custom.DataPrazo{n}"),
    ]
}

/// One follow-up action agreed in the meeting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextStep {
    /// 1-based slot the step is stored in. `0` means unassigned: the step
    /// takes the first free slot on save.
    #[serde(default)]
    pub slot: usize,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub responsible: String,
    /// Local date, `YYYY-MM-DD`.
    #[serde(default)]
    pub date: String,
}

impl NextStep {
    pub fn is_empty(&self) -> bool {
        self.action.trim().is_empty()
            && self.responsible.trim().is_empty()
            && self.date.trim().is_empty()
    }
}

/// Minutes fields of a work item, with datetimes in local time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtaDetails {
    pub id: u64,
    pub title: String,
    pub state: String,
    pub location: String,
    pub start_datetime: String,
    pub finish_datetime: String,
    pub subject: String,
    pub comments: String,
    pub next_steps: Vec<NextStep>,
}

fn field_str(fields: &Map<String, Value>, name: &str) -> String {
    match fields.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

impl AtaDetails {
    /// Builds details from a work item's `fields` object.
    pub fn from_fields(id: u64, fields: &Map<String, Value>) -> Self {
        let local = |name: &str| {
            let raw = field_str(fields, name);
            utc_to_local(&raw).unwrap_or(raw)
        };

        let next_steps = (1..=NEXT_STEP_SLOTS)
            .map(|n| {
                let [action, responsible, date] = next_step_fields(n);
                let raw_date = field_str(fields, &date);
                NextStep {
                    slot: n,
                    action: field_str(fields, &action),
                    responsible: field_str(fields, &responsible),
                    date: utc_to_date(&raw_date).unwrap_or(raw_date),
                }
            })
            .filter(|step| !step.is_empty())
            .collect();

        Self {
            id,
            title: field_str(fields, FIELD_TITLE),
            state: field_str(fields, FIELD_STATE),
            location: field_str(fields, FIELD_LOCATION),
            start_datetime: local(FIELD_START),
            finish_datetime: local(FIELD_FINISH),
            subject: field_str(fields, FIELD_SUBJECT),
            comments: field_str(fields, FIELD_COMMENTS),
            next_steps,
        }
    }
}

/// A JSON Patch operation as accepted by the Work Item Tracking API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: String,
    pub path: String,
    pub value: Value,
}

impl PatchOperation {
    pub fn add(field: &str, value: impl Into<Value>) -> Self {
        Self {
            op: "add".to_string(),
            path: format!("/fields/{field}"),
            value: value.into(),
        }
    }

    /// Reference name of the field this operation targets.
    pub fn field(&self) -> &str {
        self.path.trim_start_matches("/fields/")
    }
}

/// Patch that moves a work item to `state`.
pub fn status_patch(state: &str) -> Vec<PatchOperation> {
    vec![PatchOperation::add(FIELD_STATE, state)]
}

/// Minutes fields submitted from the editor. Absent scalar fields are left
/// untouched; next steps are always written in full.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AtaUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_datetime: Option<String>,
    #[serde(default)]
    pub finish_datetime: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub next_steps: Vec<NextStep>,
}

fn to_utc_field(name: &str, value: &str) -> Result<String, AtaError> {
    if value.trim().is_empty() {
        return Ok(String::new());
    }
    local_to_utc(value).ok_or_else(|| AtaError::InvalidInput(format!("{name}: invalid datetime '{value}'")))
}

fn to_utc_date(slot: usize, value: &str) -> Result<String, AtaError> {
    if value.trim().is_empty() {
        return Ok(String::new());
    }
    date_to_utc(value)
        .ok_or_else(|| AtaError::InvalidInput(format!("next step {slot}: invalid date '{value}'")))
}

impl AtaUpdate {
    /// Builds the patch document. Each filled next step is written to its own
    /// slot, unassigned ones to the first free slots in order, and every other
    /// slot is cleared.
    pub fn to_patch_operations(&self) -> Result<Vec<PatchOperation>, AtaError> {
        let mut ops = Vec::new();

        let plain = [
            (FIELD_TITLE, &self.title),
            (FIELD_STATE, &self.state),
            (FIELD_LOCATION, &self.location),
            (FIELD_SUBJECT, &self.subject),
            (FIELD_COMMENTS, &self.comments),
        ];
        for (field, value) in plain {
            if let Some(v) = value {
                ops.push(PatchOperation::add(field, v.as_str()));
            }
        }

        for (field, value) in [(FIELD_START, &self.start_datetime), (FIELD_FINISH, &self.finish_datetime)] {
            if let Some(v) = value {
                ops.push(PatchOperation::add(field, to_utc_field(field, v)?));
            }
        }

        let slots = self.assign_slots()?;

        for (index, step) in slots.iter().enumerate() {
            let n = index + 1;
            let [action_field, responsible_field, date_field] = next_step_fields(n);
            let (action, responsible, date) = match step {
                Some(step) => (
                    step.action.trim().to_string(),
                    step.responsible.trim().to_string(),
                    to_utc_date(n, &step.date)?,
                ),
                None => (String::new(), String::new(), String::new()),
            };
            ops.push(PatchOperation::add(&action_field, action));
            ops.push(PatchOperation::add(&responsible_field, responsible));
            ops.push(PatchOperation::add(&date_field, date));
        }

        Ok(ops)
    }

    /// Places filled steps into the fixed slots, keeping explicit positions.
    fn assign_slots(&self) -> Result<[Option<&NextStep>; NEXT_STEP_SLOTS], AtaError> {
        let filled: Vec<&NextStep> = self.next_steps.iter().filter(|s| !s.is_empty()).collect();
        if filled.len() > NEXT_STEP_SLOTS {
            return Err(AtaError::InvalidInput(format!(
                "at most {NEXT_STEP_SLOTS} next steps are supported, got {}",
                filled.len()
            )));
        }

        let mut slots: [Option<&NextStep>; NEXT_STEP_SLOTS] = [None; NEXT_STEP_SLOTS];
        let (placed, unassigned): (Vec<&NextStep>, Vec<&NextStep>) =
            filled.into_iter().partition(|step| step.slot != 0);

        for step in placed {
            let entry = slots.get_mut(step.slot - 1).ok_or_else(|| {
                AtaError::InvalidInput(format!("next step slot {} is out of range 1..={NEXT_STEP_SLOTS}", step.slot))
            })?;
            if entry.is_some() {
                return Err(AtaError::InvalidInput(format!("next step slot {} is used twice", step.slot)));
            }
            *entry = Some(step);
        }

        let mut free = slots.iter_mut().filter(|entry| entry.is_none());
        for step in unassigned {
            // The count check above guarantees a free slot per step.
            if let Some(entry) = free.next() {
                *entry = Some(step);
            }
        }

        Ok(slots)
    }
}
