use prism_core::{
    Aggregator, AssociatedViews, ExploreConfig, FieldId, FieldKind, OrderBy, PipelineError,
    ResizeMode, TaskMode,
};
use prism_explore::{IgnoreReason, Outcome, ResizeConfig};
use prism_test_utils::assertions::{assert_applied, assert_committed_at};
use prism_test_utils::fixtures::{harness, harness_with, sample_fields, space, viz};
use prism_test_utils::SpecifyStep;
use serde_json::json;

fn three_spaces() -> Vec<prism_core::InsightSpace> {
    vec![
        space(&["region", "gender"], &["sales"]),
        space(&["city"], &["sales"]),
        space(&["region", "gender", "city"], &["profit"]),
    ]
}

fn fid(name: &str) -> FieldId {
    FieldId::new(name)
}

// ============================================================================
// COMMITTED TRANSITIONS
// ============================================================================

#[tokio::test]
async fn commit_sets_cursor_and_resets_overlays() {
    let h = harness(three_spaces());
    assert_applied(&h.engine.commit_transition(1).await);

    let state = h.engine.snapshot();
    assert_committed_at(&state, 1);
    let view = state.cursor.view.as_ref().unwrap();
    assert_eq!(view.dimensions(), &[fid("city")]);
    assert_eq!(view.ops(), &[Aggregator::Sum]);
}

#[tokio::test]
async fn commit_passes_space_significance_to_resolver() {
    let h = harness(vec![space(&["city"], &["sales"]).with_significance(0.25)]);
    h.engine.commit_transition(0).await;
    let requests = h.pipeline.specify_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].significance, Some(0.25));
}

#[tokio::test]
async fn commit_out_of_range_is_ignored() {
    let h = harness(three_spaces());
    let before = h.engine.snapshot();
    let outcome = h.engine.commit_transition(3).await;
    assert_eq!(
        outcome,
        Outcome::Ignored(IgnoreReason::OutOfRange { index: 3, len: 3 })
    );
    assert_eq!(h.engine.snapshot(), before);
    assert_eq!(h.pipeline.specify_calls(), 0);
}

#[tokio::test]
async fn failed_or_empty_resolution_keeps_previous_state() {
    let h = harness(three_spaces());
    h.engine.commit_transition(0).await;
    let before = h.engine.snapshot();

    h.pipeline.push_step(SpecifyStep::Empty);
    assert_eq!(h.engine.commit_transition(2).await, Outcome::Unresolved);
    assert_eq!(h.engine.snapshot(), before);

    let err = PipelineError::request_failed("specify", "boom");
    h.pipeline.push_step(SpecifyStep::Fail(err.clone()));
    assert_eq!(h.engine.commit_transition(2).await, Outcome::Failed(err));
    assert_eq!(h.engine.snapshot(), before);
}

#[tokio::test]
async fn commit_resets_resize_but_keeps_other_preferences() {
    let h = harness(three_spaces());
    h.engine.update_visual_config(|visual| {
        visual.resize = ResizeMode::Control;
        visual.resize_config = ResizeConfig {
            width: 900,
            height: 700,
        };
        visual.zoom = true;
    });
    h.engine.commit_transition(0).await;
    let visual = h.engine.snapshot().visual;
    assert_eq!(visual.resize, ResizeMode::Auto);
    assert_eq!(visual.resize_config, ResizeConfig { width: 320, height: 320 });
    assert!(visual.zoom);
}

#[tokio::test]
async fn commit_clears_associations_and_details() {
    let h = harness(three_spaces());
    h.engine.commit_transition(0).await;
    h.pipeline.set_associations(Some(AssociatedViews {
        first_order: vec![viz(space(&["city"], &["sales"]))],
        second_order: vec![viz(space(&["gender"], &["profit"]))],
    }));
    h.pipeline.set_details(Some(vec![space(&["city"], &["profit"])]));
    assert_applied(&h.engine.load_associated_views(None).await);
    assert_applied(&h.engine.scan_details(0).await);

    let loaded = h.engine.snapshot();
    assert!(loaded.panels.show_associations);
    assert_eq!(loaded.associations_t1.len(), 1);
    assert_eq!(loaded.details.len(), 1);

    h.engine.commit_transition(1).await;
    assert_committed_at(&h.engine.snapshot(), 1);
}

#[tokio::test]
async fn subscribers_see_committed_snapshot() {
    let h = harness(three_spaces());
    let mut rx = h.engine.subscribe();
    h.engine.commit_transition(2).await;
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().cursor.page_index, 2);
}

// ============================================================================
// NAVIGATION
// ============================================================================

#[tokio::test]
async fn field_num_scenario_advance_and_retreat() {
    let h = harness(three_spaces());
    assert_applied(&h.engine.set_order(OrderBy::FieldNum).await);

    let ordered = h.engine.ordered_spaces();
    let counts: Vec<usize> = ordered.iter().map(|s| s.dimensions.len()).collect();
    assert_eq!(counts, vec![1, 2, 3]);

    h.engine.advance().await;
    h.engine.advance().await;
    assert_eq!(h.engine.snapshot().page_index(), 2);
    h.engine.retreat().await;
    assert_eq!(h.engine.snapshot().page_index(), 1);
}

#[tokio::test]
async fn navigation_wraps_at_both_ends() {
    let h = harness(three_spaces());
    h.engine.retreat().await;
    assert_eq!(h.engine.snapshot().page_index(), 2);
    h.engine.advance().await;
    assert_eq!(h.engine.snapshot().page_index(), 0);
}

#[tokio::test]
async fn navigation_on_empty_collection_is_guarded() {
    let h = harness(Vec::new());
    assert_eq!(
        h.engine.advance().await,
        Outcome::Ignored(IgnoreReason::EmptyCollection)
    );
    assert_eq!(
        h.engine.retreat().await,
        Outcome::Ignored(IgnoreReason::EmptyCollection)
    );
    assert_eq!(h.pipeline.specify_calls(), 0);
}

#[tokio::test]
async fn jump_to_view_uses_set_equality() {
    let h = harness(vec![
        space(&["city"], &["sales"]),
        space(&["b", "a"], &["m"]),
    ]);
    let outcome = h.engine.jump_to_view(&space(&["a", "b"], &["m"])).await;
    assert_applied(&outcome);
    assert_eq!(h.engine.snapshot().page_index(), 1);
}

#[tokio::test]
async fn jump_to_view_without_match_is_noop() {
    let h = harness(three_spaces());
    let outcome = h.engine.jump_to_view(&space(&["nothing"], &["m"])).await;
    assert_eq!(outcome, Outcome::Ignored(IgnoreReason::NoMatchingSpace));
    assert!(!h.engine.snapshot().has_view());
}

#[tokio::test]
async fn set_order_keeps_page_index_not_space() {
    let h = harness(three_spaces());
    h.engine.commit_transition(0).await;
    let before = h.engine.snapshot().cursor.view.unwrap();

    h.engine.set_order(OrderBy::FieldNum).await;
    let state = h.engine.snapshot();
    assert_eq!(state.order_by, OrderBy::FieldNum);
    assert_eq!(state.page_index(), 0);
    let after = state.cursor.view.unwrap();
    assert_ne!(after, before);
    assert_eq!(after.dimensions(), &[fid("city")]);
}

#[tokio::test]
async fn cardinality_order_uses_catalog() {
    let h = harness(three_spaces());
    h.engine.set_order(OrderBy::Cardinality).await;
    let ordered = h.engine.ordered_spaces();
    // region+gender = 14, city = 300, all three = 314
    assert_eq!(ordered[0].dimensions, vec![fid("region"), fid("gender")]);
    assert_eq!(ordered[1].dimensions, vec![fid("city")]);
    assert_eq!(ordered[2].dimensions.len(), 3);
}

#[tokio::test]
async fn ordering_reads_pipeline_live() {
    let h = harness(three_spaces());
    assert_eq!(h.engine.ordered_spaces().len(), 3);
    h.pipeline.set_spaces(vec![space(&["city"], &["sales"])]);
    assert_eq!(h.engine.ordered_spaces().len(), 1);
}

// ============================================================================
// FORK VIEW
// ============================================================================

#[tokio::test]
async fn fork_mutations_do_not_touch_committed_view() {
    let h = harness(three_spaces());
    h.engine.commit_transition(1).await;
    let committed = h.engine.snapshot().cursor;

    assert_applied(&h.engine.add_field(FieldKind::Dimensions, fid("gender")).await);
    assert_applied(&h.engine.add_field(FieldKind::Measures, fid("profit")).await);
    assert_applied(&h.engine.remove_field(FieldKind::Measures, &fid("sales")).await);

    let state = h.engine.snapshot();
    assert_eq!(state.cursor, committed);
    let fork = state.fork.view.as_ref().unwrap();
    assert_eq!(fork.dimensions(), &[fid("city"), fid("gender")]);
    assert_eq!(fork.measures(), &[fid("profit")]);
    assert_eq!(fork.ops().len(), 1);

    let fork_spec = state.fork.spec.as_ref().expect("fork spec resolved");
    assert_eq!(fork_spec.schema.as_value()["measures"], json!(["profit"]));
}

#[tokio::test]
async fn fork_resolution_uses_configured_significance() {
    let mut config = ExploreConfig::standard();
    config.fork_significance = 0.5;
    let h = harness_with(three_spaces(), sample_fields(), config);
    h.engine.commit_transition(0).await;
    h.engine.add_field(FieldKind::Dimensions, fid("city")).await;
    let requests = h.pipeline.specify_requests();
    assert_eq!(requests.last().unwrap().significance, Some(0.5));
}

#[tokio::test]
async fn duplicate_add_skips_resolver() {
    let h = harness(three_spaces());
    h.engine.commit_transition(1).await;
    let calls = h.pipeline.specify_calls();
    let outcome = h.engine.add_field(FieldKind::Dimensions, fid("city")).await;
    assert_eq!(outcome, Outcome::Ignored(IgnoreReason::DuplicateField));
    assert_eq!(h.pipeline.specify_calls(), calls);
}

#[tokio::test]
async fn remove_missing_field_still_re_resolves() {
    let h = harness(three_spaces());
    h.engine.commit_transition(1).await;
    let calls = h.pipeline.specify_calls();
    assert_applied(&h.engine.remove_field(FieldKind::Dimensions, &fid("ghost")).await);
    assert_eq!(h.pipeline.specify_calls(), calls + 1);
}

#[tokio::test]
async fn fork_operations_before_first_commit_are_ignored() {
    let h = harness(three_spaces());
    assert_eq!(
        h.engine.add_field(FieldKind::Dimensions, fid("city")).await,
        Outcome::Ignored(IgnoreReason::NoForkView)
    );
    assert_eq!(
        h.engine.remove_field(FieldKind::Dimensions, &fid("city")).await,
        Outcome::Ignored(IgnoreReason::NoForkView)
    );
    assert!(!h.engine.set_fork_op(0, Aggregator::Mean));
    assert_eq!(h.pipeline.specify_calls(), 0);
}

#[tokio::test]
async fn set_fork_op_changes_fork_only() {
    let h = harness(three_spaces());
    h.engine.commit_transition(0).await;
    let committed = h.engine.snapshot().cursor;

    assert!(h.engine.set_fork_op(0, Aggregator::Mean));
    assert!(!h.engine.set_fork_op(1, Aggregator::Mean));

    let state = h.engine.snapshot();
    assert_eq!(state.cursor, committed);
    assert_eq!(state.fork.view.as_ref().unwrap().ops(), &[Aggregator::Mean]);
    assert_eq!(state.cursor.view.as_ref().unwrap().ops(), &[Aggregator::Sum]);
}

#[tokio::test]
async fn failed_fork_resolution_keeps_fork_spec() {
    let h = harness(three_spaces());
    h.engine.commit_transition(1).await;
    h.engine.add_field(FieldKind::Dimensions, fid("gender")).await;
    let resolved = h.engine.snapshot().fork.spec;
    assert!(resolved.is_some());

    h.pipeline.push_step(SpecifyStep::Empty);
    assert_eq!(
        h.engine.add_field(FieldKind::Dimensions, fid("region")).await,
        Outcome::Unresolved
    );
    assert_eq!(h.engine.snapshot().fork.spec, resolved);
}

// ============================================================================
// REQUEST SEQUENCING
// ============================================================================

#[tokio::test]
async fn slow_earlier_commit_does_not_overwrite_later_one() {
    let h = harness(three_spaces());
    let gate = h.pipeline.hold_next_specify();

    let slow = tokio::spawn({
        let engine = h.engine.clone();
        async move { engine.commit_transition(0).await }
    });
    h.pipeline.wait_for_specify_calls(1).await;

    assert_applied(&h.engine.commit_transition(2).await);
    gate.release();
    assert_eq!(slow.await.unwrap(), Outcome::Stale);

    assert_committed_at(&h.engine.snapshot(), 2);
}

#[tokio::test]
async fn fork_result_landing_after_commit_is_dropped() {
    let h = harness(three_spaces());
    h.engine.commit_transition(0).await;

    let gate = h.pipeline.hold_next_specify();
    let slow = tokio::spawn({
        let engine = h.engine.clone();
        async move { engine.add_field(FieldKind::Dimensions, FieldId::new("city")).await }
    });
    h.pipeline.wait_for_specify_calls(2).await;

    assert_applied(&h.engine.commit_transition(1).await);
    gate.release();
    assert_eq!(slow.await.unwrap(), Outcome::Stale);

    let state = h.engine.snapshot();
    assert!(state.fork.spec.is_none());
    assert_eq!(state.fork.view, state.cursor.view);
}

#[tokio::test]
async fn older_fork_resolution_is_superseded() {
    let h = harness(three_spaces());
    h.engine.commit_transition(1).await;

    let gate = h.pipeline.hold_next_specify();
    let slow = tokio::spawn({
        let engine = h.engine.clone();
        async move { engine.add_field(FieldKind::Dimensions, FieldId::new("gender")).await }
    });
    h.pipeline.wait_for_specify_calls(2).await;

    assert_applied(&h.engine.add_field(FieldKind::Measures, fid("profit")).await);
    gate.release();
    assert_eq!(slow.await.unwrap(), Outcome::Stale);

    let spec = h.engine.snapshot().fork.spec.unwrap();
    assert_eq!(spec.schema.as_value()["measures"], json!(["sales", "profit"]));
}

#[tokio::test]
async fn association_result_landing_after_commit_is_dropped() {
    let h = harness(three_spaces());
    h.engine.commit_transition(0).await;
    h.pipeline.set_associations(Some(AssociatedViews {
        first_order: vec![viz(space(&["city"], &["sales"]))],
        second_order: vec![viz(space(&["gender"], &["profit"]))],
    }));

    let gate = h.pipeline.hold_next_associations();
    let slow = tokio::spawn({
        let engine = h.engine.clone();
        async move { engine.load_associated_views(None).await }
    });
    h.pipeline.wait_for_association_calls(1).await;

    assert_applied(&h.engine.commit_transition(1).await);
    gate.release();
    assert_eq!(slow.await.unwrap(), Outcome::Stale);

    let state = h.engine.snapshot();
    assert!(state.associations_t1.is_empty());
    assert!(state.associations_t2.is_empty());
    assert!(!state.panels.show_associations);
}

#[tokio::test]
async fn detail_result_landing_after_commit_is_dropped() {
    let h = harness(three_spaces());
    h.engine.commit_transition(0).await;
    h.pipeline.set_details(Some(vec![space(&["city"], &["profit"])]));

    let gate = h.pipeline.hold_next_details();
    let slow = tokio::spawn({
        let engine = h.engine.clone();
        async move { engine.scan_details(0).await }
    });
    h.pipeline.wait_for_detail_calls(1).await;

    assert_applied(&h.engine.commit_transition(2).await);
    gate.release();
    assert_eq!(slow.await.unwrap(), Outcome::Stale);

    assert!(h.engine.snapshot().details.is_empty());
}

// ============================================================================
// CONSTRAINTS, ASSOCIATIONS, AUXILIARY
// ============================================================================

#[tokio::test]
async fn constraints_initialize_from_catalog_and_cycle() {
    let h = harness(three_spaces());
    h.engine.init_constraints();
    let state = h.engine.snapshot();
    assert_eq!(state.constraints.dimensions().len(), 3);
    assert_eq!(state.constraints.measures().len(), 2);

    assert!(h.engine.cycle_constraint(FieldKind::Measures, 1));
    assert_eq!(
        h.engine.snapshot().constraints.included(FieldKind::Measures),
        vec![fid("profit")]
    );
    assert!(!h.engine.cycle_constraint(FieldKind::Measures, 9));
}

#[tokio::test]
async fn constraint_cycle_on_empty_list_is_noop() {
    let h = harness(three_spaces());
    let before = h.engine.snapshot();
    assert!(!h.engine.cycle_constraint(FieldKind::Dimensions, 0));
    assert_eq!(h.engine.snapshot(), before);
}

#[tokio::test]
async fn associations_use_current_space_and_mode() {
    let h = harness(three_spaces());
    h.engine.commit_transition(1).await;
    h.engine.load_associated_views(Some(TaskMode::Server)).await;
    h.engine.load_associated_views(None).await;
    let requests = h.pipeline.association_requests();
    assert_eq!(requests[0].0, vec![fid("city")]);
    assert_eq!(requests[0].2, TaskMode::Server);
    assert_eq!(requests[1].2, TaskMode::Local);
}

#[tokio::test]
async fn association_failure_is_noop() {
    let h = harness(three_spaces());
    h.engine.commit_transition(0).await;
    let before = h.engine.snapshot();
    h.pipeline.set_associations(None);
    assert!(matches!(
        h.engine.load_associated_views(None).await,
        Outcome::Failed(_)
    ));
    assert_eq!(h.engine.snapshot(), before);
}

#[tokio::test]
async fn associations_without_current_space_are_ignored() {
    let h = harness(Vec::new());
    assert_eq!(
        h.engine.load_associated_views(None).await,
        Outcome::Ignored(IgnoreReason::NoCurrentSpace)
    );
}

#[tokio::test]
async fn view_data_failure_yields_no_rows() {
    let h = harness(three_spaces());
    let mut row = prism_core::Row::new();
    row.insert("sales".to_string(), json!(42));
    h.analytics.set_rows(Some(vec![row]));
    let rows = h
        .engine
        .view_data(vec![fid("city")], vec![fid("sales")], vec![Aggregator::Sum])
        .await;
    assert_eq!(rows.len(), 1);
    assert_eq!(h.analytics.cube_requests()[0].aggregators, vec![Aggregator::Sum]);

    h.analytics.set_rows(None);
    let rows = h
        .engine
        .view_data(vec![fid("city")], vec![fid("sales")], vec![Aggregator::Sum])
        .await;
    assert!(rows.is_empty());
}

#[tokio::test]
async fn sub_insight_failure_yields_empty_list() {
    let h = harness(three_spaces());
    h.analytics.set_insights(Some(vec![json!({ "type": "outlier" })]));
    assert_eq!(h.engine.sub_insights(&[fid("city")], &[fid("sales")]).await.len(), 1);
    h.analytics.set_insights(None);
    assert!(h.engine.sub_insights(&[fid("city")], &[fid("sales")]).await.is_empty());
}

#[tokio::test]
async fn bring_to_editor_copies_committed_schema() {
    let h = harness(three_spaces());
    assert!(!h.engine.bring_to_editor());
    h.engine.commit_transition(0).await;
    assert!(h.engine.bring_to_editor());
    let state = h.engine.snapshot();
    assert_eq!(
        state.editor_spec.as_ref(),
        state.cursor.spec.as_ref().map(|spec| &spec.schema)
    );
}

#[tokio::test]
async fn panel_setters_toggle_flags() {
    let h = harness(three_spaces());
    h.engine.set_show_constraints(true);
    h.engine.set_show_preferences(true);
    h.engine.set_show_save_modal(true);
    h.engine.set_show_subinsights(true);
    h.engine.set_show_associations(true);
    let panels = h.engine.snapshot().panels;
    assert!(panels.show_constraints);
    assert!(panels.show_preferences);
    assert!(panels.show_save_modal);
    assert!(panels.show_subinsights);
    assert!(panels.show_associations);

    h.engine.set_aggregated(true);
    assert!(h.engine.snapshot().visual.default_aggregated);
}
