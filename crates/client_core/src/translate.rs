use shared::domain::{DeviceCommand, ScentId, SequenceItem};

use crate::{
    catalog::Catalog,
    error::{ClientError, TranslationFault},
};

/// Maps a composed sequence onto device slots, all or nothing.
///
/// The first item whose scent is unknown, has no location, or whose location
/// is not an integer aborts the whole translation.
pub fn translate(
    catalog: &Catalog,
    items: &[SequenceItem],
) -> Result<Vec<DeviceCommand>, ClientError> {
    items
        .iter()
        .map(|item| {
            let scent_id = resolve_scent_id(catalog, &item.scent_name)?;
            Ok(DeviceCommand {
                scent_id,
                duration: item.scent_duration,
            })
        })
        .collect()
}

fn resolve_scent_id(catalog: &Catalog, scent_name: &str) -> Result<ScentId, ClientError> {
    let fail = |fault| ClientError::Translation {
        scent_name: scent_name.to_string(),
        fault,
    };

    let entry = catalog
        .get(scent_name)
        .ok_or_else(|| fail(TranslationFault::UnknownScent))?;
    let location = entry
        .device_location()
        .ok_or_else(|| fail(TranslationFault::MissingLocation))?;
    location
        .parse::<i64>()
        .map(ScentId)
        .map_err(|_| fail(TranslationFault::InvalidLocation))
}

#[cfg(test)]
mod tests {
    use shared::error::ErrorKind;

    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_json_str(
            r#"{
                "Cedar": {"location": "1"},
                "Rain": {"location": 4},
                "Smoke": {"family": "dark"},
                "Fog": {"location": "left tray"}
            }"#,
        )
        .expect("catalog")
    }

    fn item(name: &str, secs: u32) -> SequenceItem {
        SequenceItem {
            scent_name: name.to_string(),
            scent_duration: secs,
        }
    }

    #[test]
    fn empty_sequence_translates_to_no_commands() {
        assert!(translate(&catalog(), &[]).expect("empty").is_empty());
        assert!(translate(&Catalog::empty(), &[]).expect("empty").is_empty());
    }

    #[test]
    fn preserves_order_count_and_durations() {
        let items = vec![item("Rain", 20), item("Cedar", 30), item("Rain", 10)];
        let commands = translate(&catalog(), &items).expect("translate");

        assert_eq!(commands.len(), items.len());
        assert_eq!(
            commands.iter().map(|c| c.scent_id).collect::<Vec<_>>(),
            vec![ScentId(4), ScentId(1), ScentId(4)]
        );
        for (command, item) in commands.iter().zip(&items) {
            assert_eq!(command.duration, item.scent_duration);
        }
    }

    #[test]
    fn unknown_scent_fails_whole_translation() {
        let items = vec![item("Cedar", 30), item("Lavender", 30)];
        let err = translate(&catalog(), &items).expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::Translation);
        match err {
            ClientError::Translation { scent_name, fault } => {
                assert_eq!(scent_name, "Lavender");
                assert_eq!(fault, TranslationFault::UnknownScent);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn entry_without_location_is_refused() {
        let err = translate(&catalog(), &[item("Smoke", 5)]).expect_err("must fail");
        assert!(matches!(
            err,
            ClientError::Translation {
                fault: TranslationFault::MissingLocation,
                ..
            }
        ));
        assert_eq!(err.to_string(), "location not found for scent: Smoke");
    }

    #[test]
    fn non_numeric_location_is_refused() {
        let err = translate(&catalog(), &[item("Fog", 5)]).expect_err("must fail");
        assert!(matches!(
            err,
            ClientError::Translation {
                fault: TranslationFault::InvalidLocation,
                ..
            }
        ));
    }

    #[test]
    fn empty_catalog_refuses_any_scent() {
        let err = translate(&Catalog::empty(), &[item("Cedar", 5)]).expect_err("must fail");
        assert!(err.to_string().contains("Cedar"));
    }
}
