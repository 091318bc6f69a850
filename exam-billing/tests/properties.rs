use exam_billing::*;
use proptest::prelude::*;
use rust_decimal::Decimal;

const CLINICS: [&str; 3] = ["Clínica A", "Clínica B", "Centro Évora"];
const SPECIALISTS: [&str; 3] = ["Dr. Silva", "Dra. Souza", "Dr. Alves"];
const EXAM_TYPES: [&str; 6] = [
    "Diagnóstico de Panorâmica",
    "Diagnóstico de Periapical",
    "Tomografia de até 2 dentes",
    "Tomografia da Maxila",
    "Consulta Interna",
    "Raio-X Estranho",
];

fn row_strategy() -> impl Strategy<Value = UploadedRow> {
    (
        0..CLINICS.len(),
        proptest::option::of(0..SPECIALISTS.len()),
        0..EXAM_TYPES.len(),
        proptest::option::of(0u32..5),
    )
        .prop_map(|(clinic, specialist, exam_type, quantity)| UploadedRow {
            patient: "Paciente".to_string(),
            exam_type: EXAM_TYPES[exam_type].to_string(),
            clinic: CLINICS[clinic].to_string(),
            specialist: specialist.map(|i| SPECIALISTS[i].to_string()),
            quantity,
        })
}

fn price_strategy() -> impl Strategy<Value = PriceTable> {
    (0i64..500, 0i64..500, 0i64..500, 0i64..500).prop_map(|(a, b, c, d)| PriceTable {
        total_2d: Decimal::new(a * 10, 1),
        partial_2d: Decimal::new(b * 10, 1),
        total_3d: Decimal::new(c, 0),
        partial_3d: Decimal::new(d, 0),
    })
}

fn inputs_strategy() -> impl Strategy<Value = PipelineInputs> {
    (
        proptest::collection::vec(row_strategy(), 0..40),
        proptest::collection::vec(price_strategy(), 2),
        price_strategy(),
    )
        .prop_map(|(rows, clinic_prices, specialist_price)| PipelineInputs {
            rows,
            clinics: CLINICS
                .iter()
                .zip(clinic_prices)
                .map(|(name, prices)| Clinic::new(name, prices))
                .collect(),
            specialist_prices: vec![SpecialistPrice::new("clínica a", "DR. SILVA", specialist_price)],
            custom_mappings: vec![CustomMapping::new("Consulta Interna", ExamCategory::NotChargeable)],
            criteria: FilterCriteria::default(),
        })
}

proptest! {
    #[test]
    fn recompute_is_idempotent(inputs in inputs_strategy()) {
        let processor = RecordProcessor::default();
        prop_assert_eq!(recompute_all(&processor, &inputs), recompute_all(&processor, &inputs));
    }

    #[test]
    fn grand_total_matches_clinics_and_records(inputs in inputs_strategy()) {
        let outputs = recompute_all(&RecordProcessor::default(), &inputs);
        let by_clinic: Decimal = outputs.totals.clinics.iter().map(|c| c.total).sum();
        let by_record: Decimal = outputs.records.iter().map(|r| r.value).sum();
        prop_assert_eq!(outputs.totals.grand_total, by_clinic);
        prop_assert_eq!(outputs.totals.grand_total, by_record);

        for clinic in &outputs.totals.clinics {
            let by_specialist: Decimal = clinic.specialists.iter().map(|s| s.total).sum();
            prop_assert_eq!(clinic.total, by_specialist);
        }
    }

    #[test]
    fn counts_match_effective_quantities(inputs in inputs_strategy()) {
        let outputs = recompute_all(&RecordProcessor::default(), &inputs);
        let counted: u64 = outputs
            .totals
            .clinics
            .iter()
            .flat_map(|c| c.specialists.iter())
            .map(|s| s.count)
            .sum();
        let expected: u64 = inputs.rows.iter().map(|r| u64::from(r.effective_quantity())).sum();
        prop_assert_eq!(counted, expected);
    }

    #[test]
    fn totals_ignore_row_order(inputs in inputs_strategy()) {
        let processor = RecordProcessor::default();
        let forward = recompute_all(&processor, &inputs);

        let mut reversed_inputs = inputs.clone();
        reversed_inputs.rows.reverse();
        let reversed = recompute_all(&processor, &reversed_inputs);

        prop_assert_eq!(forward.totals, reversed.totals);
    }

    #[test]
    fn filtering_never_adds(inputs in inputs_strategy(), clinic in 0..CLINICS.len(), specialist in 0..SPECIALISTS.len()) {
        let mut filtered_inputs = inputs.clone();
        filtered_inputs.criteria = FilterCriteria {
            clinics: vec![CLINICS[clinic].to_string()],
            specialists: vec![SPECIALISTS[specialist].to_string()],
            ..FilterCriteria::default()
        };
        let outputs = recompute_all(&RecordProcessor::default(), &filtered_inputs);

        prop_assert!(outputs.filter_active);
        prop_assert!(outputs.filtered_records.iter().all(|r| outputs.records.contains(r)));
        prop_assert!(outputs.filtered_totals.grand_total <= outputs.totals.grand_total);
        prop_assert_eq!(outputs.display_totals(), &outputs.filtered_totals);
    }

    #[test]
    fn filter_matching_everything_keeps_totals(inputs in inputs_strategy()) {
        let mut filtered_inputs = inputs.clone();
        filtered_inputs.criteria = FilterCriteria {
            clinics: CLINICS.iter().map(|c| c.to_string()).collect(),
            ..FilterCriteria::default()
        };
        let outputs = recompute_all(&RecordProcessor::default(), &filtered_inputs);

        prop_assert!(outputs.filter_active);
        prop_assert_eq!(&outputs.filtered_records, &outputs.records);
        prop_assert_eq!(outputs.filtered_totals.grand_total, outputs.totals.grand_total);
        prop_assert_eq!(&outputs.filtered_totals, &outputs.totals);
    }

    #[test]
    fn not_chargeable_records_are_zero(inputs in inputs_strategy()) {
        let outputs = recompute_all(&RecordProcessor::default(), &inputs);
        for record in outputs.records.iter().filter(|r| r.not_chargeable) {
            prop_assert_eq!(record.value, Decimal::ZERO);
            prop_assert!(record.has_price);
        }
    }

    #[test]
    fn override_beats_built_in(index in 0..4usize) {
        let built_in = [
            "Diagnóstico de Panorâmica",
            "Diagnóstico de Periapical",
            "Tomografia de até 2 dentes",
            "Tomografia da Maxila",
        ];
        let name = built_in[index];
        let overrides = CustomMappings::from_mappings(&[CustomMapping::new(name, ExamCategory::NotChargeable)]);
        prop_assert_eq!(classify(name, &overrides), Classification::Mapped(ExamCategory::NotChargeable));
    }
}
