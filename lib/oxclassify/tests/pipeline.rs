use oxclassify::{
    AxiomCompiler, BackendKind, ClassificationPipeline, ClassificationResults, ClassifierConfig,
    ClassifierError, CompileError, CompiledDefinition, InverseCompiler, PipelineError,
    ProgressUpdate, Stage,
};
use oxlogic::{
    ConceptId, ConcreteOperator, LogicNode, LogicalDefinition, NodeKind, RoleOperator, vocab,
};
use oxrdf::Literal;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

const BACKENDS: [BackendKind; 2] = [BackendKind::Native, BackendKind::Formal];

fn id(id: u64) -> ConceptId {
    ConceptId::new(id)
}

fn ids<const N: usize>(ids: [u64; N]) -> BTreeSet<ConceptId> {
    ids.into_iter().map(ConceptId::new).collect()
}

fn pipeline(backend: BackendKind) -> ClassificationPipeline {
    ClassificationPipeline::new(
        ClassifierConfig::new()
            .with_backend(backend)
            .with_worker_threads(2),
    )
    .unwrap()
}

async fn classify(
    backend: BackendKind,
    definitions: Vec<LogicalDefinition>,
) -> ClassificationResults {
    pipeline(backend).run(&definitions).await.unwrap()
}

fn necessary(concept: u64, elements: impl IntoIterator<Item = LogicNode>) -> LogicalDefinition {
    LogicalDefinition::necessary(id(concept), LogicNode::and(elements))
}

fn concept(concept: u64) -> LogicNode {
    LogicNode::concept(id(concept))
}

fn role(role_type: u64, filler: u64) -> LogicNode {
    LogicNode::role(id(role_type), concept(filler))
}

/// Concept references and (role type, filler) pairs of a definition tree, role groups flattened.
fn flatten(
    node: &LogicNode,
    concepts: &mut BTreeSet<ConceptId>,
    roles: &mut BTreeSet<(ConceptId, ConceptId)>,
) {
    match node.kind() {
        NodeKind::ConceptReference(id) => {
            concepts.insert(*id);
        }
        NodeKind::Role { role_type, .. } if *role_type != vocab::ROLE_GROUP => {
            if let Some(NodeKind::ConceptReference(filler)) =
                node.single_child().map(LogicNode::kind)
            {
                roles.insert((*role_type, *filler));
            }
        }
        _ => {
            for child in node.children() {
                flatten(child, concepts, roles);
            }
        }
    }
}

#[tokio::test]
async fn test_parents_follow_necessary_sets() {
    for backend in BACKENDS {
        let results = classify(
            backend,
            vec![necessary(1, [concept(2)]), necessary(2, [concept(100)])],
        )
        .await;
        assert_eq!(results.parents(id(1)), Some(&ids([2])), "{backend}");
        assert_eq!(results.parents(id(2)), Some(&ids([100])), "{backend}");
        assert_eq!(results.children(id(100)), Some(&ids([2])), "{backend}");
        assert!(!results.summary.incomplete, "{backend}");
    }
}

#[tokio::test]
async fn test_sufficient_set_is_bidirectional() {
    for backend in BACKENDS {
        let results = classify(
            backend,
            vec![
                LogicalDefinition::sufficient(id(1), concept(2)),
                necessary(3, [concept(2)]),
            ],
        )
        .await;
        assert_eq!(results.equivalents(id(1)), Some(&ids([2])), "{backend}");
        assert_eq!(results.equivalents(id(2)), Some(&ids([1])), "{backend}");
        // 3 ⊑ 2 ⊑ 1
        assert!(results.children(id(1)).unwrap().contains(&id(3)), "{backend}");
    }
}

#[tokio::test]
async fn test_sub_role_type_is_a_sub_concept() {
    for backend in BACKENDS {
        let results = classify(
            backend,
            vec![
                LogicalDefinition::property(id(10), LogicNode::and([concept(11)])),
                necessary(1, [role(10, 2)]),
            ],
        )
        .await;
        assert_eq!(results.parents(id(10)), Some(&ids([11])), "{backend}");
        assert!(results.children(id(11)).unwrap().contains(&id(10)), "{backend}");
    }
}

#[tokio::test]
async fn test_existential_through_sub_role() {
    for backend in BACKENDS {
        let results = classify(
            backend,
            vec![
                LogicalDefinition::property(id(10), LogicNode::and([concept(11)])),
                necessary(1, [role(10, 2)]),
                LogicalDefinition::sufficient(id(3), LogicNode::and([role(11, 2)])),
            ],
        )
        .await;
        assert_eq!(results.parents(id(1)), Some(&ids([3])), "{backend}");
    }
}

#[tokio::test]
async fn test_disjunction_fails_the_run() {
    for backend in BACKENDS {
        let error = pipeline(backend)
            .run(&vec![
                necessary(1, [concept(2)]),
                LogicalDefinition::necessary(id(3), LogicNode::or([concept(1), concept(2)])),
            ])
            .await
            .unwrap_err();
        assert_eq!(error.concept(), Some(id(3)), "{backend}");
        assert_eq!(error.failed_stage(), Some(Stage::Extraction), "{backend}");
        assert!(
            matches!(
                error,
                PipelineError::Stage {
                    source: ClassifierError::Compile(CompileError::Unsupported { .. }),
                    ..
                }
            ),
            "{backend}"
        );
    }
}

#[tokio::test]
async fn test_failed_run_has_no_taxonomy() {
    let mut pipeline = pipeline(BackendKind::Native);
    pipeline
        .run(&vec![LogicalDefinition::necessary(
            id(3),
            LogicNode::and([LogicNode::or([concept(1), concept(2)])]),
        )])
        .await
        .unwrap_err();
    let classifier = pipeline.classifier().unwrap();
    assert_eq!(classifier.backend().parents(id(3)), None);
    assert!(classifier.backend().summary().concept_ids.is_empty());
}

#[tokio::test]
async fn test_conjunction_arity_is_checked() {
    for definition in [
        necessary(1, Vec::<LogicNode>::new()),
        LogicalDefinition::new(
            id(1),
            LogicNode::definition_root([LogicNode::new(
                NodeKind::NecessarySet,
                [concept(2), concept(3)],
            )]),
        ),
    ] {
        let error = pipeline(BackendKind::Native)
            .run(&vec![definition])
            .await
            .unwrap_err();
        assert_eq!(error.concept(), Some(id(1)));
        assert!(matches!(
            error,
            PipelineError::Stage {
                source: ClassifierError::Compile(CompileError::Structure { .. }),
                ..
            }
        ));
    }
}

#[tokio::test]
async fn test_universal_restriction_is_unsupported() {
    let error = pipeline(BackendKind::Native)
        .run(&vec![necessary(
            1,
            [LogicNode::new(
                NodeKind::Role {
                    role_type: id(10),
                    operator: RoleOperator::Universal,
                },
                [concept(2)],
            )],
        )])
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        PipelineError::Stage {
            source: ClassifierError::Compile(CompileError::Unsupported { .. }),
            ..
        }
    ));
}

#[tokio::test]
async fn test_role_chain() {
    for backend in BACKENDS {
        let results = classify(
            backend,
            vec![
                // located in o part of ⊑ located in
                LogicalDefinition::property(
                    id(10),
                    LogicNode::and([LogicNode::property_sequence_implication(
                        [id(10), id(11)],
                        id(10),
                    )]),
                ),
                necessary(1, [role(10, 2)]),
                necessary(2, [role(11, 3)]),
                LogicalDefinition::sufficient(id(4), LogicNode::and([role(10, 3)])),
            ],
        )
        .await;
        assert_eq!(results.parents(id(1)), Some(&ids([4])), "{backend}");
        assert!(!results.parents(id(2)).unwrap().contains(&id(4)), "{backend}");
    }
}

#[tokio::test]
async fn test_transitive_role() {
    for backend in BACKENDS {
        let results = classify(
            backend,
            vec![
                LogicalDefinition::property(
                    id(10),
                    LogicNode::and([LogicNode::concept(vocab::TRANSITIVE_PROPERTY)]),
                ),
                necessary(1, [role(10, 2)]),
                necessary(2, [role(10, 3)]),
                LogicalDefinition::sufficient(id(4), LogicNode::and([role(10, 3)])),
            ],
        )
        .await;
        assert!(results.parents(id(1)).unwrap().contains(&id(4)), "{backend}");
    }
}

#[tokio::test]
async fn test_role_groups() {
    for backend in BACKENDS {
        let results = classify(
            backend,
            vec![
                necessary(
                    1,
                    [LogicNode::role_group(LogicNode::and([role(10, 2), role(11, 3)]))],
                ),
                LogicalDefinition::sufficient(
                    id(4),
                    LogicNode::and([LogicNode::role_group(LogicNode::and([role(10, 2)]))]),
                ),
                // the two roles are in different groups
                necessary(
                    5,
                    [
                        LogicNode::role_group(LogicNode::and([role(10, 2)])),
                        LogicNode::role_group(LogicNode::and([role(11, 3)])),
                    ],
                ),
                LogicalDefinition::sufficient(
                    id(6),
                    LogicNode::and([LogicNode::role_group(LogicNode::and([role(10, 2), role(11, 3)]))]),
                ),
            ],
        )
        .await;
        assert_eq!(results.parents(id(1)), Some(&ids([6])), "{backend}");
        assert_eq!(results.parents(id(6)), Some(&ids([4])), "{backend}");
        assert_eq!(results.parents(id(5)), Some(&ids([4])), "{backend}");
        assert!(!results.parents(id(5)).unwrap().contains(&id(6)), "{backend}");
    }
}

#[tokio::test]
async fn test_concrete_values() {
    let weight = |value: i64| {
        LogicNode::feature(
            id(20),
            ConcreteOperator::Equal,
            Literal::from(value),
        )
    };
    for backend in BACKENDS {
        let results = classify(
            backend,
            vec![
                LogicalDefinition::new(
                    id(20),
                    LogicNode::definition_root([LogicNode::data_property_set(LogicNode::and([
                        LogicNode::concept(vocab::DATA_ROLE_ROOT),
                    ]))]),
                ),
                necessary(1, [concept(3), weight(5)]),
                necessary(2, [concept(3), weight(6)]),
                LogicalDefinition::sufficient(id(4), LogicNode::and([concept(3), weight(5)])),
            ],
        )
        .await;
        assert_eq!(results.parents(id(1)), Some(&ids([4])), "{backend}");
        assert_eq!(results.parents(id(2)), Some(&ids([3])), "{backend}");
        assert!(!results.summary.incomplete, "{backend}");
    }
}

#[tokio::test]
async fn test_ranges_flag_the_run_incomplete() {
    for backend in BACKENDS {
        let results = classify(
            backend,
            vec![necessary(
                1,
                [LogicNode::feature(
                    id(20),
                    ConcreteOperator::GreaterThan,
                    Literal::from(5),
                )],
            )],
        )
        .await;
        assert!(results.summary.incomplete, "{backend}");
        assert!(results.taxonomy.contains_key(&id(1)), "{backend}");
    }
}

#[tokio::test]
async fn test_normal_forms_only_keep_stated_relationships() {
    for backend in BACKENDS {
        let stated = [
            LogicalDefinition::property(id(10), LogicNode::and([concept(11)])),
            necessary(1, [concept(2), role(10, 3)]),
            necessary(2, [concept(4), role(11, 3), role(12, 5)]),
            necessary(6, [concept(1)]),
        ];
        let results = classify(backend, stated.to_vec()).await;

        let mut stated_concepts = BTreeSet::new();
        let mut stated_roles = BTreeSet::new();
        for definition in &stated {
            flatten(definition.root(), &mut stated_concepts, &mut stated_roles);
        }
        assert!(!results.inferred.is_empty(), "{backend}");
        for inferred in &results.inferred {
            let mut concepts = BTreeSet::new();
            let mut roles = BTreeSet::new();
            flatten(inferred.root(), &mut concepts, &mut roles);
            assert!(concepts.is_subset(&stated_concepts), "{backend}: {inferred}");
            assert!(roles.is_subset(&stated_roles), "{backend}: {inferred}");
        }

        let six = results
            .inferred
            .iter()
            .find(|definition| definition.concept() == id(6))
            .unwrap();
        let mut concepts = BTreeSet::new();
        let mut roles = BTreeSet::new();
        flatten(six.root(), &mut concepts, &mut roles);
        assert_eq!(concepts, ids([1]), "{backend}");
        // r11 some 3 is implied by r10 some 3
        assert_eq!(
            roles,
            [(id(10), id(3)), (id(12), id(5))].into_iter().collect(),
            "{backend}"
        );
    }
}

#[test]
fn test_role_type_flags_round_trip() {
    let stated = LogicalDefinition::property(
        id(10),
        LogicNode::and([
            concept(11),
            LogicNode::concept(vocab::TRANSITIVE_PROPERTY),
            LogicNode::concept(vocab::REFLEXIVE_PROPERTY),
        ]),
    );
    let CompiledDefinition::RoleType(role_type) = AxiomCompiler::compile(&stated).unwrap() else {
        panic!("a role type was expected");
    };
    let inverse = InverseCompiler::role_type(&role_type);
    let CompiledDefinition::RoleType(round_trip) = AxiomCompiler::compile(&inverse).unwrap() else {
        panic!("a role type was expected");
    };
    assert!(round_trip.transitive);
    assert!(round_trip.reflexive);
    assert_eq!(round_trip, role_type);
}

#[tokio::test]
async fn test_progress_is_reported_for_every_step() {
    let updates = Arc::new(Mutex::new(Vec::<ProgressUpdate>::new()));
    let listener_updates = Arc::clone(&updates);
    let mut pipeline = ClassificationPipeline::new(
        ClassifierConfig::new()
            .with_worker_threads(1)
            .with_progress_interval(1),
    )
    .unwrap()
    .with_progress_listener(move |update| listener_updates.lock().unwrap().push(update));
    pipeline
        .run(&vec![necessary(1, [concept(2)]), necessary(2, [concept(3)])])
        .await
        .unwrap();
    let updates = updates.lock().unwrap();
    for step in 1..=4 {
        assert!(
            updates
                .iter()
                .any(|update| update.step == step && update.percent == 100),
            "step {step} never completed"
        );
    }
    assert_eq!(
        updates.last(),
        Some(&ProgressUpdate {
            step: 4,
            total_steps: 4,
            percent: 100
        })
    );
}

#[tokio::test]
async fn test_consumer_receives_the_results() {
    let received = Arc::new(Mutex::new(None));
    let consumer_received = Arc::clone(&received);
    let mut pipeline = pipeline(BackendKind::Native).with_consumer(move |results| {
        *consumer_received.lock().unwrap() = Some(results.taxonomy.len());
    });
    let results = pipeline
        .run(&vec![necessary(1, [concept(2)])])
        .await
        .unwrap();
    assert_eq!(*received.lock().unwrap(), Some(results.taxonomy.len()));
}

#[tokio::test]
async fn test_cancelled_run() {
    for backend in BACKENDS {
        let mut pipeline = pipeline(backend);
        pipeline.cancellation_token().cancel();
        let error = pipeline
            .run(&vec![necessary(1, [concept(2)])])
            .await
            .unwrap_err();
        assert!(error.is_cancelled(), "{backend}: {error}");
    }
}
