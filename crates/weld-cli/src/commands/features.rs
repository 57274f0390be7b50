//! `weld features` lists every slot with its variants.

use serde_json::{Map, Value};
use weld_core::domain::FeatureSlot;

use crate::{
    cli::{FeaturesArgs, ListFormat, OutputFormat},
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: FeaturesArgs, output: OutputManager) -> CliResult<()> {
    let format = if output.format() == OutputFormat::Json {
        ListFormat::Json
    } else {
        args.format
    };

    match format {
        ListFormat::Json => output.json(&as_json())?,
        ListFormat::List => {
            for slot in FeatureSlot::ALL {
                for variant in slot.variants() {
                    output.print(&format!("{slot}={variant}"))?;
                }
            }
        }
        ListFormat::Table => {
            output.header(&format!("{:<15} {}", "SLOT", "VARIANTS"))?;
            for slot in FeatureSlot::ALL {
                output.print(&format!("{:<15} {}", slot.as_str(), slot.variants().join(", ")))?;
            }
            output.print("")?;
            output.print("Slots are composed top to bottom. 'none' leaves a slot empty.")?;
        }
    }
    Ok(())
}

/// `{ "<slot>": { "priority": n, "variants": [...], "labels": [...] } }`
fn as_json() -> Value {
    let slots: Map<String, Value> = FeatureSlot::ALL
        .iter()
        .map(|slot| {
            (
                slot.as_str().to_string(),
                serde_json::json!({
                    "priority": slot.priority(),
                    "prompt": slot.prompt(),
                    "variants": slot.variants(),
                    "labels": slot.labels(),
                }),
            )
        })
        .collect();
    Value::Object(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_lists_every_slot_with_none_first() {
        let value = as_json();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), FeatureSlot::ALL.len());
        assert_eq!(value["task-queue"]["variants"][0], "none");
        assert_eq!(value["database"]["priority"], 0);
    }
}
