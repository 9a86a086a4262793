//! Stored form of one seesaw
//!
//! Writing is plain serde. Reading is lenient: every field is pulled out of
//! the JSON value on its own, so one garbled field falls back to its default
//! instead of discarding the whole seesaw.

use serde::Serialize;
use serde_json::Value;

use crate::config::SeesawConfig;
use crate::sim::{DroppedObject, Seesaw, Side, ruler_ticks, min_plank_width};

/// Persisted snapshot of a seesaw
///
/// Optional fields are `None` only when read back from damaged data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeesawRecord {
    pub id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lever_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_torque: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_torque: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id_counter: Option<u32>,
    pub objects: Vec<DroppedObject>,
}

/// Non-negative whole number (ids, counters)
///
/// `u32::MAX` is rejected so that `id + 1` always fits.
fn as_index(value: &Value) -> Option<u32> {
    let n = value.as_f64()?;
    if n >= 0.0 && n.fract() == 0.0 && n < f64::from(u32::MAX) {
        Some(n as u32)
    } else {
        None
    }
}

/// The id after `id`, `None` when that one could not be read back
pub(crate) fn id_after(id: u32) -> Option<u32> {
    id.checked_add(1).filter(|next| *next < u32::MAX)
}

fn finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}

fn non_negative(value: &Value) -> Option<f64> {
    finite(value).filter(|n| *n >= 0.0)
}

fn positive(value: &Value) -> Option<f64> {
    finite(value).filter(|n| *n > 0.0)
}

/// Read the `id` of a stored seesaw without parsing the rest
pub(crate) fn record_id(value: &Value) -> Option<u32> {
    value.get("id").and_then(as_index)
}

fn object_from_value(value: &Value, index: usize, config: &SeesawConfig) -> Option<DroppedObject> {
    // Without a position or weight the object has no physical meaning
    let position = value.get("position").and_then(finite)?;
    let weight = value.get("weight").and_then(positive)?;
    if position.abs() > config.max_plank_width / 2.0 {
        log::warn!("Object at {position} is beyond the widest plank");
        return None;
    }

    let id = value
        .get("id")
        .and_then(as_index)
        .unwrap_or(index as u32);
    let size = value
        .get("size")
        .and_then(positive)
        .unwrap_or_else(|| config.object_size(weight));
    let color = value
        .get("color")
        .and_then(Value::as_str)
        .map(String::from)
        .or_else(|| config.colors.first().cloned())
        .unwrap_or_default();
    let torque_applied = value
        .get("torqueApplied")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let obj = DroppedObject::restored(id, position, weight, size, color, torque_applied);
    if let Some(stored) = value.get("side").and_then(Value::as_str).and_then(Side::from_str) {
        if stored != obj.side {
            log::warn!("Object {id}: stored side {stored:?} disagrees with position {position}");
        }
    }
    Some(obj)
}

impl SeesawRecord {
    /// Parse a stored seesaw; `None` only when it has no usable id
    pub fn from_value(value: &Value, config: &SeesawConfig) -> Option<Self> {
        let id = record_id(value)?;
        let field = |name: &str| value.get(name);

        let objects = match field("objects").and_then(Value::as_array) {
            Some(entries) => {
                let objects: Vec<DroppedObject> = entries
                    .iter()
                    .enumerate()
                    .filter_map(|(i, v)| object_from_value(v, i, config))
                    .collect();
                if objects.len() != entries.len() {
                    log::warn!(
                        "Seesaw {id}: dropped {} unreadable object(s)",
                        entries.len() - objects.len()
                    );
                }
                objects
            }
            None => Vec::new(),
        };

        Some(Self {
            id,
            name: field("name")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from),
            lever_width: field("leverWidth")
                .or_else(|| field("plankWidth"))
                .and_then(positive),
            current_angle: field("currentAngle").and_then(finite),
            left_torque: field("leftTorque").and_then(non_negative),
            right_torque: field("rightTorque").and_then(non_negative),
            left_weight: field("leftWeight").and_then(non_negative),
            right_weight: field("rightWeight").and_then(non_negative),
            next_weight: field("nextWeight").and_then(positive),
            object_id_counter: field("objectIdCounter").and_then(as_index),
            objects,
        })
    }
}

impl Seesaw {
    /// Snapshot everything that survives a reload
    pub fn to_record(&self) -> SeesawRecord {
        SeesawRecord {
            id: self.id,
            name: Some(self.name.clone()),
            lever_width: Some(self.plank_width),
            current_angle: Some(self.balance.current_angle),
            left_torque: Some(self.balance.left_torque),
            right_torque: Some(self.balance.right_torque),
            left_weight: Some(self.balance.left_weight),
            right_weight: Some(self.balance.right_weight),
            next_weight: Some(self.next_weight),
            object_id_counter: Some(self.object_id_counter),
            objects: self.objects.clone(),
        }
    }

    /// Replace this seesaw's state with a stored snapshot
    ///
    /// Missing fields fall back independently: torque and weight totals are
    /// recomputed from the landed objects, the next weight is re-rolled, the
    /// width falls back to the configured default. Out-of-range weights and
    /// widths are treated as missing. Objects come back at rest.
    pub fn load_record(&mut self, record: SeesawRecord, config: &SeesawConfig) {
        if let Some(name) = record.name {
            self.name = name;
        }
        self.objects = record.objects;
        self.pending_offset = None;

        self.balance.current_angle = record
            .current_angle
            .unwrap_or(0.0)
            .clamp(-config.max_angle, config.max_angle);
        self.balance.left_torque = record
            .left_torque
            .unwrap_or_else(|| self.landed_torque(Side::Left));
        self.balance.right_torque = record
            .right_torque
            .unwrap_or_else(|| self.landed_torque(Side::Right));
        self.balance.left_weight = record
            .left_weight
            .unwrap_or_else(|| self.landed_weight(Side::Left));
        self.balance.right_weight = record
            .right_weight
            .unwrap_or_else(|| self.landed_weight(Side::Right));

        let weights = f64::from(config.min_weight)..=f64::from(config.max_weight);
        self.next_weight = match record.next_weight.filter(|w| weights.contains(w)) {
            Some(weight) => weight,
            None => self.roll_weight(config),
        };

        // Never hand out an id that a restored object already has
        let past_objects = self.objects.iter().map(|o| o.id.saturating_add(1)).max().unwrap_or(0);
        self.object_id_counter = record.object_id_counter.unwrap_or(0).max(past_objects);

        let width = record
            .lever_width
            .filter(|w| (config.min_plank_width..=config.max_plank_width).contains(w))
            .unwrap_or(config.plank_width);
        self.plank_width = width.max(min_plank_width(&self.objects, config));
        self.ruler = ruler_ticks(self.plank_width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ObjectPhase;
    use serde_json::json;

    fn config() -> SeesawConfig {
        SeesawConfig::default()
    }

    #[test]
    fn test_record_json_shape() {
        let config = config();
        let mut seesaw = Seesaw::new(1, &config, 5);
        seesaw
            .objects
            .push(DroppedObject::new(0, -40.0, 3.0, "#e74c3c".into(), &config));

        let value = serde_json::to_value(seesaw.to_record()).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["name"], "Seesaw 2");
        assert_eq!(value["leverWidth"], 400.0);
        assert_eq!(value["objectIdCounter"], 0);
        let obj = &value["objects"][0];
        assert_eq!(obj["position"], -40.0);
        assert_eq!(obj["distance"], 40.0);
        assert_eq!(obj["side"], "left");
        assert_eq!(obj["size"], 21.0);
        assert_eq!(obj["torqueApplied"], false);
        // Animation scratch state is not persisted
        assert!(obj.get("phase").is_none());
        assert!(obj.get("bounceVelocity").is_none());
    }

    #[test]
    fn test_save_restore_two_objects() {
        let config = config();
        let mut saved = Seesaw::new(0, &config, 5);
        let mut falling = DroppedObject::new(0, -150.0, 4.0, "#3498db".into(), &config);
        falling.bounce_velocity = -2.0;
        let mut settled = DroppedObject::new(1, 90.0, 7.0, "#2ecc71".into(), &config);
        settled.phase = ObjectPhase::Settled;
        settled.torque_applied = true;
        settled.bounce_velocity = -1.5;
        saved.balance.add_torque(settled.side, settled.weight, settled.distance);
        saved.objects = vec![falling, settled];
        saved.object_id_counter = 2;

        let json = serde_json::to_string(&saved.to_record()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let record = SeesawRecord::from_value(&value, &config).unwrap();

        let mut restored = Seesaw::new(0, &config, 77);
        restored.load_record(record, &config);

        assert_eq!(restored.balance.left_torque, saved.balance.left_torque);
        assert_eq!(restored.balance.right_torque, saved.balance.right_torque);
        assert_eq!(restored.next_weight, saved.next_weight);
        assert_eq!(restored.object_id_counter, 2);
        for (a, b) in restored.objects.iter().zip(&saved.objects) {
            assert_eq!(a.position, b.position);
            assert_eq!(a.weight, b.weight);
            assert_eq!(a.torque_applied, b.torque_applied);
            assert_eq!(a.phase, ObjectPhase::Settled);
            assert_eq!(a.bounce_velocity, 0.0);
        }
    }

    #[test]
    fn test_garbled_fields_default_independently() {
        let config = config();
        let value = json!({
            "id": 3,
            "name": 42,
            "leverWidth": "wide",
            "currentAngle": null,
            "rightTorque": -5,
            "nextWeight": 0,
            "objectIdCounter": "x",
            "objects": [
                { "id": 0, "position": 120, "weight": 2, "torqueApplied": true },
                { "id": 1, "weight": 5 },
                { "id": 2, "position": -50, "weight": "heavy" },
                "junk"
            ]
        });

        let record = SeesawRecord::from_value(&value, &config).unwrap();
        assert_eq!(record.id, 3);
        assert_eq!(record.name, None);
        assert_eq!(record.lever_width, None);
        assert_eq!(record.right_torque, None);
        assert_eq!(record.next_weight, None);
        assert_eq!(record.objects.len(), 1);
        assert_eq!(record.objects[0].size, config.object_size(2.0));

        let mut seesaw = Seesaw::new(3, &config, 9);
        seesaw.load_record(record, &config);
        assert_eq!(seesaw.name, "Seesaw 4");
        assert_eq!(seesaw.plank_width, 400.0);
        assert_eq!(seesaw.balance.current_angle, 0.0);
        // Recomputed from the one landed object
        assert_eq!(seesaw.balance.right_torque, 240.0);
        assert_eq!(seesaw.balance.right_weight, 2.0);
        assert!(seesaw.next_weight >= 1.0);
        assert_eq!(seesaw.object_id_counter, 1);
    }

    #[test]
    fn test_missing_id_is_unreadable() {
        assert!(SeesawRecord::from_value(&json!({ "name": "x" }), &config()).is_none());
        assert!(SeesawRecord::from_value(&json!({ "id": -1 }), &config()).is_none());
        assert!(SeesawRecord::from_value(&json!("nope"), &config()).is_none());
    }

    #[test]
    fn test_legacy_plank_width_key() {
        let config = config();
        let record =
            SeesawRecord::from_value(&json!({ "id": 0, "plankWidth": 720 }), &config).unwrap();
        assert_eq!(record.lever_width, Some(720.0));
    }

    #[test]
    fn test_restore_widens_plank_for_far_objects() {
        let config = config();
        let value = json!({
            "id": 0,
            "leverWidth": 400,
            "objects": [{ "id": 0, "position": -300, "weight": 1, "torqueApplied": true }]
        });
        let record = SeesawRecord::from_value(&value, &config).unwrap();
        let mut seesaw = Seesaw::new(0, &config, 1);
        seesaw.load_record(record, &config);
        assert_eq!(seesaw.plank_width, 640.0);
    }

    #[test]
    fn test_restore_ignores_out_of_range_geometry() {
        let config = config();
        let value = json!({
            "id": 0,
            "leverWidth": 1e13,
            "nextWeight": 1e300,
            "objects": [
                { "id": 0, "position": 1e12, "weight": 1, "torqueApplied": true },
                { "id": 1, "position": -120, "weight": 2, "torqueApplied": true }
            ]
        });
        let record = SeesawRecord::from_value(&value, &config).unwrap();
        assert_eq!(record.objects.len(), 1);
        assert_eq!(record.objects[0].position, -120.0);

        let mut seesaw = Seesaw::new(0, &config, 1);
        seesaw.load_record(record, &config);
        assert_eq!(seesaw.plank_width, 400.0);
        assert_eq!(seesaw.ruler.len(), 9);
        assert!((1.0..=10.0).contains(&seesaw.next_weight));
        assert_eq!(seesaw.balance.left_torque, 240.0);
    }

    #[test]
    fn test_ids_at_end_of_range() {
        let config = config();
        assert!(SeesawRecord::from_value(&json!({ "id": 4_294_967_295_u64 }), &config).is_none());
        assert_eq!(id_after(4_294_967_293), Some(4_294_967_294));
        assert_eq!(id_after(4_294_967_294), None);

        let value = json!({
            "id": 4_294_967_294_u64,
            "objects": [
                { "id": 4_294_967_295_u64, "position": 50, "weight": 1 },
                { "id": 4_294_967_294_u64, "position": 60, "weight": 1 }
            ]
        });
        let record = SeesawRecord::from_value(&value, &config).unwrap();
        // Unreadable object ids fall back to the list index
        assert_eq!(record.objects[0].id, 0);
        assert_eq!(record.objects[1].id, 4_294_967_294);

        let mut seesaw = Seesaw::new(record.id, &config, 1);
        seesaw.load_record(record, &config);
        assert_eq!(seesaw.name, "Seesaw 4294967295");
        assert_eq!(seesaw.object_id_counter, u32::MAX);
        assert_eq!(seesaw.next_object_id(), u32::MAX);
        assert_eq!(seesaw.next_object_id(), u32::MAX);
    }
}
