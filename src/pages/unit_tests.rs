//! Unit test strategies, plans and cases
//!
//! Plans hang under strategies, cases and evidences under plans. A plan may
//! name the unit it tests (`sw_unit`), linked to its design page.

use serde::Serialize;
use tracing::debug;

use super::{templates, AssemblyContext, RenderRequest};
use crate::attachments::AttachmentMeta;
use crate::error::Result;
use crate::layout::{self, CrossRef, PageLocation};
use crate::model::{TestCaseFields, TestPlanFields, TypedNode};

#[derive(Debug, Serialize)]
struct StrategyRow {
    label: String,
    slug: String,
    doc_path: String,
}

#[derive(Debug, Serialize)]
struct IndexPage {
    strategies: Vec<StrategyRow>,
}

#[derive(Debug, Clone, Serialize)]
struct CaseDetails {
    description: Option<String>,
    preconditions: Option<String>,
    steps: Vec<String>,
    expected_result: Option<String>,
    status: Option<String>,
}

impl CaseDetails {
    fn from_fields(fields: &TestCaseFields) -> Self {
        Self {
            description: fields.description.clone(),
            preconditions: fields.preconditions.clone(),
            steps: fields.steps.clone(),
            expected_result: fields.expected_result.clone(),
            status: fields.status.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CasePage {
    title: String,
    #[serde(flatten)]
    details: CaseDetails,
}

#[derive(Debug, Serialize)]
struct CaseRow {
    label: String,
    doc_path: String,
    #[serde(flatten)]
    details: CaseDetails,
}

#[derive(Debug, Serialize)]
struct PlanPage {
    title: String,
    description: Option<String>,
    unit: Option<CrossRef>,
    test_cases: Vec<CaseRow>,
    evidences: Vec<AttachmentMeta>,
}

#[derive(Debug, Serialize)]
struct PlanRow {
    label: String,
    slug: String,
    description: Option<String>,
    doc_path: String,
    test_cases_count: usize,
    evidences_count: usize,
    unit: Option<CrossRef>,
}

#[derive(Debug, Serialize)]
struct StrategyPage {
    title: String,
    description: Option<String>,
    tools: Vec<String>,
    environment: Option<String>,
    plans: Vec<PlanRow>,
}

fn tested_unit(ctx: &AssemblyContext<'_>, plan: &TypedNode<TestPlanFields>, from: &PageLocation) -> Option<CrossRef> {
    let unit_id = plan.fields.sw_unit.as_deref()?;
    match ctx.resolver().unit(unit_id) {
        Ok(unit) => Some(from.cross_ref(unit.label.clone(), &unit.doc_path)),
        Err(e) => {
            debug!(plan = %plan.id(), "tested unit not linked: {}", e);
            None
        }
    }
}

/// Writes the plan page and its case pages, returns the plan's row for the
/// strategy page
fn assemble_plan(
    ctx: &AssemblyContext<'_>,
    plan: &TypedNode<TestPlanFields>,
    strategy_page: &PageLocation,
    requests: &mut Vec<RenderRequest>,
) -> Result<Option<PlanRow>> {
    let catalog = ctx.catalog;
    let Some(entry) = ctx.indexes.test_plans.get(plan.id()) else {
        return Ok(None);
    };
    let page = PageLocation::new(entry.doc_path.clone());

    let mut cases = Vec::new();
    for case in catalog.children(&catalog.test_cases, &catalog.test_plans, plan.id()) {
        let Some(case_entry) = ctx.indexes.test_cases.get(case.id()) else {
            continue;
        };
        let details = CaseDetails::from_fields(&case.fields);
        let case_page = PageLocation::new(case_entry.doc_path.clone());
        requests.push(RenderRequest::page(
            templates::TEST_CASE,
            &CasePage {
                title: case_entry.label.clone(),
                details: details.clone(),
            },
            &case_page,
        )?);
        cases.push(CaseRow {
            label: case_entry.label.clone(),
            doc_path: page.link_to(&case_entry.doc_path),
            details,
        });
    }

    let evidences = ctx.attachments.materialize_all(
        catalog.children(&catalog.attachments, &catalog.test_plans, plan.id()),
        layout::STATIC_TEST_EVIDENCES,
        &page,
    );

    let row = PlanRow {
        label: entry.label.clone(),
        slug: entry.slug.clone(),
        description: plan.fields.description.clone(),
        doc_path: strategy_page.link_to(&entry.doc_path),
        test_cases_count: cases.len(),
        evidences_count: evidences.len(),
        unit: tested_unit(ctx, plan, strategy_page),
    };

    requests.push(RenderRequest::page(
        templates::TEST_PLAN,
        &PlanPage {
            title: entry.label.clone(),
            description: plan.fields.description.clone(),
            unit: tested_unit(ctx, plan, &page),
            test_cases: cases,
            evidences,
        },
        &page,
    )?);
    Ok(Some(row))
}

pub fn assemble(ctx: &AssemblyContext<'_>) -> Result<Vec<RenderRequest>> {
    let catalog = ctx.catalog;
    let index_page = PageLocation::new(layout::UNIT_TESTS_INDEX);
    let mut requests = Vec::new();
    let mut strategies = Vec::new();

    for strategy in catalog.test_strategies.iter() {
        let Some(entry) = ctx.indexes.test_strategies.get(strategy.id()) else {
            continue;
        };
        let page = PageLocation::new(entry.doc_path.clone());

        let mut plans = Vec::new();
        for plan in catalog.children(&catalog.test_plans, &catalog.test_strategies, strategy.id()) {
            if let Some(row) = assemble_plan(ctx, plan, &page, &mut requests)? {
                plans.push(row);
            }
        }

        requests.push(RenderRequest::page(
            templates::TEST_STRATEGY,
            &StrategyPage {
                title: entry.label.clone(),
                description: strategy.fields.description.clone(),
                tools: strategy.fields.tools.clone(),
                environment: strategy.fields.environment.clone(),
                plans,
            },
            &page,
        )?);
        strategies.push(StrategyRow {
            label: entry.label.clone(),
            slug: entry.slug.clone(),
            doc_path: index_page.link_to(&entry.doc_path),
        });
    }

    requests.push(RenderRequest::page(
        templates::UNIT_TESTS_INDEX,
        &IndexPage { strategies },
        &index_page,
    )?);
    Ok(requests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::fixtures::{graph, Fixture};
    use std::path::PathBuf;

    fn find<'a>(requests: &'a [RenderRequest], output: &str) -> &'a serde_json::Value {
        &requests
            .iter()
            .find(|r| r.output == PathBuf::from(output))
            .unwrap_or_else(|| panic!("no request for {}", output))
            .context
    }

    #[test]
    fn test_strategy_plan_and_case_pages() {
        let fixture = Fixture::new(graph());
        let requests = assemble(&fixture.ctx()).unwrap();

        let index = find(&requests, "unit_tests/index.rst");
        assert_eq!(index["strategies"][0]["doc_path"], "strategies/Strategy");

        let strategy = find(&requests, "unit_tests/strategies/Strategy.rst");
        assert_eq!(strategy["tools"][0], "gtest");
        let plan_row = &strategy["plans"][0];
        assert_eq!(plan_row["doc_path"], "../plans/Brake-Plan");
        assert_eq!(plan_row["test_cases_count"], 1);
        assert_eq!(plan_row["evidences_count"], 1);
        assert_eq!(plan_row["unit"]["doc_path"], "../../design/items/Brake-Unit");

        let plan = find(&requests, "unit_tests/plans/Brake-Plan.rst");
        assert_eq!(plan["test_cases"][0]["doc_path"], "../cases/TC-1");
        assert_eq!(plan["test_cases"][0]["status"], "passed");
        assert_eq!(plan["evidences"][0]["doc_path"], "../../logs/run.txt");
        assert_eq!(plan["unit"]["label"], "Brake Unit");

        let case = find(&requests, "unit_tests/cases/TC-1.rst");
        assert_eq!(case["title"], "TC 1");
        assert_eq!(case["steps"][0], "press");
    }

    #[test]
    fn test_no_strategies_still_writes_index() {
        let fixture = Fixture::new(vec![]);
        let requests = assemble(&fixture.ctx()).unwrap();
        assert_eq!(requests.len(), 1);
        assert!(find(&requests, "unit_tests/index.rst")["strategies"]
            .as_array()
            .unwrap()
            .is_empty());
    }
}
