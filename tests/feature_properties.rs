//! Property tests for the feature encoder

use churn_risk_dashboard::types::customer::{CustomerRecord, Gender, Geography};
use churn_risk_dashboard::FeatureEncoder;
use proptest::prelude::*;

fn geography() -> impl Strategy<Value = Geography> {
    prop_oneof![
        Just(Geography::France),
        Just(Geography::Germany),
        Just(Geography::Spain)
    ]
}

fn gender() -> impl Strategy<Value = Gender> {
    prop_oneof![Just(Gender::Male), Just(Gender::Female)]
}

prop_compose! {
    fn valid_customer()(
        id in 1u64..100_000_000,
        credit_score in 300u32..=850,
        geography in geography(),
        gender in gender(),
        age in 18u32..=100,
        tenure in 0u32..=50,
        balance in 0.0f64..250_000.0,
        num_of_products in 1u32..=10,
        has_cr_card in any::<bool>(),
        is_active_member in any::<bool>(),
        estimated_salary in 0.0f64..200_000.0,
    ) -> CustomerRecord {
        CustomerRecord {
            credit_score,
            geography,
            gender,
            tenure,
            balance,
            num_of_products,
            has_cr_card,
            is_active_member,
            estimated_salary,
            ..CustomerRecord::new(id, "Prop", age)
        }
    }
}

proptest! {
    #[test]
    fn one_hot_columns_sum_to_one(record in valid_customer()) {
        prop_assert!(record.validate().is_ok());
        let f = FeatureEncoder::new().encode(&record).unwrap();

        prop_assert_eq!(f.geography_france + f.geography_germany + f.geography_spain, 1.0);
        prop_assert_eq!(f.gender_female + f.gender_male, 1.0);
    }

    #[test]
    fn encoding_is_idempotent(record in valid_customer()) {
        let encoder = FeatureEncoder::new();
        prop_assert_eq!(encoder.encode(&record).unwrap(), encoder.encode(&record).unwrap());
    }

    #[test]
    fn middle_age_bucket(age in 31u32..=45) {
        let f = FeatureEncoder::new().encode(&CustomerRecord::new(1, "Mid", age)).unwrap();
        prop_assert_eq!(
            (f.age_group_middle_age, f.age_group_senior, f.age_group_elderly),
            (1.0, 0.0, 0.0)
        );
    }

    #[test]
    fn at_most_one_age_bucket(age in 1u32..=120) {
        let f = FeatureEncoder::new().encode(&CustomerRecord::new(1, "Any", age)).unwrap();
        let buckets = f.age_group_middle_age + f.age_group_senior + f.age_group_elderly;
        prop_assert_eq!(buckets, if age <= 30 { 0.0 } else { 1.0 });
    }

    #[test]
    fn derived_columns_follow_formulas(record in valid_customer()) {
        let f = FeatureEncoder::new().encode(&record).unwrap();
        prop_assert_eq!(f.clv, record.balance * record.estimated_salary / 100_000.0);
        prop_assert_eq!(f.tenure_age_ratio, record.tenure as f64 / record.age as f64);
    }
}

#[test]
fn elderly_and_boundary_ages() {
    let encoder = FeatureEncoder::new();

    let f = encoder.encode(&CustomerRecord::new(1, "Old", 66)).unwrap();
    assert_eq!(
        (f.age_group_middle_age, f.age_group_senior, f.age_group_elderly),
        (0.0, 0.0, 1.0)
    );

    let f = encoder.encode(&CustomerRecord::new(1, "Thirty", 30)).unwrap();
    assert_eq!(
        (f.age_group_middle_age, f.age_group_senior, f.age_group_elderly),
        (0.0, 0.0, 0.0)
    );
}
