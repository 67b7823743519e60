// File: src/core/encoder.rs
use crate::core::types::{
    district_column, Amenities, FeatureSchema, FeatureVector, AC_COLUMN, PRIVATE_BATH_COLUMN,
    ROOM_SIZE_COLUMN, SEATED_TOILET_COLUMN, WIFI_COLUMN,
};

/// One-hot encodes a form submission into a vector aligned to `schema`.
///
/// Every slot starts at zero. The room size is copied through as-is, even outside
/// the 4–20 m² range the form allows. A district whose `Lokasi_*` column is not in
/// the schema leaves all district slots at zero instead of failing. Base columns
/// missing from an unvalidated schema are skipped the same way.
pub fn encode(
    district: &str,
    room_size: f64,
    amenities: Amenities,
    schema: &FeatureSchema,
) -> FeatureVector {
    let mut vector = FeatureVector::zeros(schema.len());

    let mut put = |name: &str, value: f64| {
        if let Some(slot) = schema.position(name) {
            vector.set(slot, value);
        }
    };

    put(ROOM_SIZE_COLUMN, room_size);
    put(AC_COLUMN, indicator(amenities.ac));
    put(PRIVATE_BATH_COLUMN, indicator(amenities.private_bath));
    put(WIFI_COLUMN, indicator(amenities.wifi));
    put(SEATED_TOILET_COLUMN, indicator(amenities.seated_toilet));
    put(&district_column(district), 1.0);

    vector
}

/// True when `district` has an indicator slot in `schema`.
pub fn district_matches(district: &str, schema: &FeatureSchema) -> bool {
    schema.contains(&district_column(district))
}

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{District, DISTRICT_PREFIX};

    fn sample_schema() -> FeatureSchema {
        FeatureSchema::new([
            "Luas_Kamar_m2",
            "Ada_AC",
            "Ada_KM_Dalam",
            "Ada_WiFi",
            "Ada_Kloset_Duduk",
            "Lokasi_Ciputat",
            "Lokasi_Serpong",
        ])
    }

    fn full_schema() -> FeatureSchema {
        let mut columns: Vec<String> = vec![
            "Luas_Kamar_m2".into(),
            "Ada_AC".into(),
            "Ada_KM_Dalam".into(),
            "Ada_WiFi".into(),
            "Ada_Kloset_Duduk".into(),
        ];
        columns.extend(District::ALL.iter().map(|d| d.feature_name()));
        FeatureSchema::new(columns)
    }

    fn district_slots(schema: &FeatureSchema, vector: &FeatureVector) -> Vec<f64> {
        schema
            .columns()
            .iter()
            .zip(vector.as_slice())
            .filter(|(c, _)| c.starts_with(DISTRICT_PREFIX))
            .map(|(_, v)| *v)
            .collect()
    }

    #[test]
    fn test_reference_scenario() {
        let schema = sample_schema();
        let amenities = Amenities {
            ac: true,
            private_bath: false,
            wifi: true,
            seated_toilet: false,
        };
        let vector = encode("Ciputat", 12.0, amenities, &schema);
        assert_eq!(vector.as_slice(), &[12.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_every_known_district_sets_exactly_one_slot() {
        let schema = full_schema();
        let amenities = Amenities {
            ac: false,
            private_bath: true,
            wifi: false,
            seated_toilet: true,
        };
        for district in District::ALL {
            for size in [4.0, 9.5, 20.0] {
                let vector = encode(district.label(), size, amenities, &schema);
                assert_eq!(vector.len(), schema.len());

                let slots = district_slots(&schema, &vector);
                assert_eq!(slots.iter().filter(|v| **v == 1.0).count(), 1);
                assert_eq!(slots.iter().filter(|v| **v == 0.0).count(), 10);
                assert_eq!(vector.get(&schema, &district.feature_name()), Some(1.0));

                assert_eq!(vector.get(&schema, "Luas_Kamar_m2"), Some(size));
                assert_eq!(vector.get(&schema, "Ada_AC"), Some(0.0));
                assert_eq!(vector.get(&schema, "Ada_KM_Dalam"), Some(1.0));
                assert_eq!(vector.get(&schema, "Ada_WiFi"), Some(0.0));
                assert_eq!(vector.get(&schema, "Ada_Kloset_Duduk"), Some(1.0));
            }
        }
    }

    // Unknown labels silently lose the location signal. Kept deliberately; the
    // form list and the training categories must be checked against each other.
    #[test]
    fn test_unknown_district_encodes_without_location() {
        let schema = sample_schema();
        let vector = encode("Pamulang", 10.0, Amenities::default(), &schema);
        assert!(district_slots(&schema, &vector).iter().all(|v| *v == 0.0));
        assert_eq!(vector.get(&schema, "Luas_Kamar_m2"), Some(10.0));
        assert!(!district_matches("Pamulang", &schema));

        // Label matching is exact: casing differences are not folded.
        let vector = encode("ciputat", 10.0, Amenities::default(), &schema);
        assert!(district_slots(&schema, &vector).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let schema = full_schema();
        let amenities = Amenities {
            ac: true,
            private_bath: true,
            wifi: false,
            seated_toilet: true,
        };
        let a = encode("Serpong Utara", 13.0, amenities, &schema);
        let b = encode("Serpong Utara", 13.0, amenities, &schema);
        let bits = |v: &FeatureVector| v.as_slice().iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn test_zero_amenity_baseline() {
        let schema = sample_schema();
        let vector = encode("Serpong", 4.0, Amenities::default(), &schema);
        assert_eq!(vector.as_slice(), &[4.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);

        let vector = encode("Curug", 4.0, Amenities::default(), &schema);
        let non_zero: Vec<usize> = vector
            .as_slice()
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(non_zero, vec![0]);
    }

    #[test]
    fn test_out_of_range_size_passes_through() {
        let schema = sample_schema();
        for size in [0.0, -3.0, 150.0] {
            let vector = encode("Ciputat", size, Amenities::default(), &schema);
            assert_eq!(vector.as_slice()[0], size);
        }
    }

    #[test]
    fn test_missing_base_columns_are_skipped() {
        let schema = FeatureSchema::new(["Lokasi_Setu", "Ada_WiFi"]);
        let amenities = Amenities {
            wifi: true,
            ..Default::default()
        };
        let vector = encode("Setu", 12.0, amenities, &schema);
        assert_eq!(vector.as_slice(), &[1.0, 1.0]);

        let empty = FeatureSchema::new(Vec::<String>::new());
        assert!(encode("Setu", 12.0, amenities, &empty).is_empty());
    }
}
