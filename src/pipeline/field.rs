//! Field Array Component
//!
//! Writes one named data array into the dataset the nearest ancestor source
//! publishes through the field channel, at the source's declared attribute
//! location or its own override. The array lives inside the dataset, so the
//! owning source's teardown releases it; this component only writes.

use serde_json::Value;

use crate::channels::FieldLocation;
use crate::engine::PropBag;
use crate::errors::{Result, TrellisError};
use crate::tree::{Component, Ctx};

/// Declarative data array configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldArrayProps {
    /// Array name within the attribute location. Fixed after mount.
    pub name: String,
    /// Array content, written verbatim.
    pub values: Vec<f64>,
    /// Overrides the source's attribute location. Fixed after mount.
    pub location: Option<FieldLocation>,
}

impl FieldArrayProps {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), values: Vec::new(), location: None }
    }
}

fn array_key(location: FieldLocation, name: &str) -> String {
    let prefix = match location {
        FieldLocation::PointData => "pointData",
        FieldLocation::CellData => "cellData",
        FieldLocation::Field => "fieldData",
    };
    format!("{prefix}:{name}")
}

/// The field array component.
pub struct FieldArrayComponent {
    props: FieldArrayProps,
    mounted: bool,
}

impl FieldArrayComponent {
    #[must_use]
    pub fn new(props: FieldArrayProps) -> Self {
        Self { props, mounted: false }
    }

    /// Writes the array into the channel's dataset. Returns whether the
    /// stored value actually changed.
    fn write(&self, cx: &mut Ctx<'_>) -> Result<bool> {
        let fields =
            cx.find_fields().ok_or(TrellisError::MissingChannel { channel: "fields" })?;
        let location = self.props.location.unwrap_or(fields.location);
        let mut bag = PropBag::new();
        bag.insert(array_key(location, &self.props.name), Value::from(self.props.values.clone()));
        cx.backend.set(fields.dataset, &bag)
    }

    fn push_modified(&self, cx: &mut Ctx<'_>) {
        if let Some(dataset) = cx.find_dataset() {
            dataset.modified(&mut cx.channel_cx());
        }
    }

    /// Diffs `next` against the current props and applies the changes.
    pub fn apply(&mut self, cx: &mut Ctx<'_>, next: FieldArrayProps) -> Result<()> {
        if !self.mounted {
            self.props = next;
            return Ok(());
        }
        if next.name != self.props.name || next.location != self.props.location {
            log::warn!("field array name and location are fixed after mount; remount with a new key");
        }
        if next.values != self.props.values {
            self.props.values = next.values;
            if self.write(cx)? {
                self.push_modified(cx);
            }
        }
        Ok(())
    }
}

impl Component for FieldArrayComponent {
    fn mount(&mut self, cx: &mut Ctx<'_>) -> Result<()> {
        if self.write(cx)? {
            self.push_modified(cx);
        }
        self.mounted = true;
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_prefixed_by_location() {
        assert_eq!(array_key(FieldLocation::PointData, "temperature"), "pointData:temperature");
        assert_eq!(array_key(FieldLocation::CellData, "ids"), "cellData:ids");
        assert_eq!(array_key(FieldLocation::Field, "meta"), "fieldData:meta");
    }
}
