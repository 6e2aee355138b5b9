//! Property-based tests using proptest
//!
//! These tests exercise ARN parsing, create-response id decoding and
//! report accounting with randomized inputs.

use proptest::prelude::*;
use serde_json::{json, Value};
use tagsync::catalog::components::{display_name, extract_created_id, IdShape};
use tagsync::catalog::{CatalogRecord, FactSheetStatus, FactSheetType};
use tagsync::discovery::{parse_arn, ResourceDescriptor};
use tagsync::report::{ComponentOutcome, Outcome, Summary, SyncResult};

/// Generate a plausible ARN with a slash- or colon-separated resource part
fn arb_arn() -> impl Strategy<Value = (String, String, String, String)> {
    (
        prop_oneof!["s3", "sqs", "lambda", "dynamodb", "ec2", "rds"],
        prop_oneof!["", "us-east-1", "eu-west-1", "ap-southeast-2"],
        "[0-9]{12}",
        "[a-z][a-z0-9-]{0,30}",
        prop_oneof!["", "table/", "function:", "instance/"],
    )
        .prop_map(|(service, region, account, name, kind)| {
            let arn = format!("arn:aws:{service}:{region}:{account}:{kind}{name}");
            (arn, service.to_string(), region.to_string(), name)
        })
}

fn arb_id() -> impl Strategy<Value = String> {
    "[a-f0-9]{8}-[a-f0-9]{4}"
}

fn descriptor() -> ResourceDescriptor {
    ResourceDescriptor {
        service: "s3".into(),
        region: String::new(),
        arn: "arn:aws:s3:::b".into(),
        name: None,
        tags: None,
    }
}

fn result(success: bool, relation_error: bool) -> SyncResult {
    let outcome = if success {
        Outcome::Success {
            record: ComponentOutcome {
                record: CatalogRecord {
                    id: "fs".into(),
                    name: "AWS-S3".into(),
                    fact_sheet_type: FactSheetType::ItComponent,
                    status: FactSheetStatus::Active,
                },
                relation: None,
                relation_error: relation_error.then(|| "rejected".to_string()),
            },
        }
    } else {
        Outcome::Error {
            error: "failed".into(),
        }
    };

    SyncResult {
        resource: descriptor(),
        outcome,
        linked_application: "Billing".into(),
    }
}

proptest! {
    /// Parsing arbitrary strings never panics
    #[test]
    fn parse_never_panics(input in ".*") {
        let _ = parse_arn(&input, None);
    }

    /// Well-formed ARNs keep service, region and the trailing name
    #[test]
    fn well_formed_arns_round_out((arn, service, region, name) in arb_arn()) {
        let parsed = parse_arn(&arn, None).expect("well-formed ARN");
        prop_assert_eq!(parsed.service, service);
        prop_assert_eq!(parsed.region, region);
        prop_assert_eq!(parsed.name, Some(name));
        prop_assert_eq!(parsed.arn, arn);
    }

    /// Fewer than six segments never yields a name
    #[test]
    fn short_arns_have_no_name(
        service in "[a-z0-9]{1,10}",
        region in "[a-z0-9-]{0,12}",
        account in "[0-9]{0,12}"
    ) {
        let four = format!("arn:aws:{service}:{region}");
        let five = format!("arn:aws:{service}:{region}:{account}");
        prop_assert_eq!(parse_arn(&four, None).and_then(|r| r.name), None);
        prop_assert_eq!(parse_arn(&five, None).and_then(|r| r.name), None);
    }

    /// Display names depend only on the service
    #[test]
    fn display_name_is_per_service(service in "[a-z0-9]{1,12}", a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
        let mut first = descriptor();
        first.service = service.clone();
        first.name = Some(a);
        let mut second = first.clone();
        second.name = Some(b);

        prop_assert_eq!(display_name(&first), display_name(&second));
        prop_assert_eq!(display_name(&first), format!("AWS-{}", service.to_uppercase()));
    }

    /// Every supported envelope decodes to the same id
    #[test]
    fn shapes_are_equivalent(id in arb_id(), extra in "[a-z]{1,8}") {
        let bodies = [
            json!({"id": id, "name": extra}),
            json!({"data": {"id": id, "name": extra}}),
            json!({"data": [{"id": id}, {"id": extra}]}),
        ];
        for body in &bodies {
            let decoded = extract_created_id(body).map(|(_, id)| id);
            prop_assert_eq!(decoded.as_deref(), Some(id.as_str()));
        }
    }

    /// When both top-level and nested ids exist, the top-level one wins
    #[test]
    fn top_level_has_priority(top in arb_id(), nested in arb_id()) {
        let body = json!({"id": top, "data": [{"id": nested}]});
        prop_assert_eq!(extract_created_id(&body), Some((IdShape::TopLevel, top)));
    }

    /// Bodies without any id field never decode
    #[test]
    fn id_free_bodies_do_not_decode(name in "[a-z]{0,10}", items in 0usize..4) {
        let data: Vec<Value> = (0..items).map(|_| json!({"name": name})).collect();
        let body = json!({"name": name, "data": data});
        prop_assert_eq!(extract_created_id(&body), None);
    }

    /// Summary accounts for every result exactly once
    #[test]
    fn summary_totals_match(flags in prop::collection::vec((any::<bool>(), any::<bool>()), 0..50)) {
        let results: Vec<SyncResult> = flags
            .iter()
            .map(|(ok, rel_err)| result(*ok, *rel_err))
            .collect();
        let summary = Summary::from_results(&results, 0);

        prop_assert_eq!(summary.total, results.len());
        prop_assert_eq!(summary.succeeded + summary.failed, summary.total);
        prop_assert!(summary.relation_errors <= summary.succeeded);
    }
}
