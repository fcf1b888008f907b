//! Integration tests for the oxel reasoner.

use oxel::{
    Axiom, AxiomLoader, CancellationToken, ClassExpression, DataProperty, DataRange, ElError,
    ElReasoner, IterAxiomLoader, LoadingError, ObjectProperty, OwlClass, ReasonerConfig,
};
use oxrdf::vocab::xsd;
use oxrdf::{Literal, NamedNode};

fn class(name: &str) -> OwlClass {
    OwlClass::new(NamedNode::new(format!("http://example.org/{name}")).unwrap())
}

fn object_property(name: &str) -> ObjectProperty {
    ObjectProperty::new(NamedNode::new(format!("http://example.org/{name}")).unwrap())
}

fn data_property(name: &str) -> DataProperty {
    DataProperty::new(NamedNode::new(format!("http://example.org/{name}")).unwrap())
}

fn classify(axioms: Vec<Axiom>) -> ElReasoner {
    let mut reasoner = ElReasoner::new();
    reasoner
        .load(&mut IterAxiomLoader::new(axioms), &CancellationToken::new())
        .unwrap();
    reasoner.classify(&CancellationToken::new()).unwrap();
    reasoner
}

// ============================================================================
// Subsumption
// ============================================================================

#[test]
fn test_told_hierarchy() {
    let (animal, dog, puppy) = (class("Animal"), class("Dog"), class("Puppy"));
    let reasoner = classify(vec![
        Axiom::subclass_of(dog.clone(), animal.clone()),
        Axiom::subclass_of(puppy.clone(), dog.clone()),
    ]);
    let taxonomy = reasoner.taxonomy().unwrap();
    assert_eq!(taxonomy.len(), 3);
    assert!(taxonomy.is_subsumed_by(&puppy, &animal));
    assert_eq!(taxonomy.parents(&puppy).unwrap().len(), 1);
    assert!(taxonomy.parents(&puppy).unwrap().contains(&dog));
    assert!(taxonomy.children(&animal).unwrap().contains(&dog));
    assert!(!taxonomy.children(&animal).unwrap().contains(&puppy));
}

#[test]
fn test_defined_class_through_existential() {
    let (disease, heart, organ) = (class("Disease"), class("Heart"), class("Organ"));
    let (heart_disease, organ_disease) = (class("HeartDisease"), class("OrganDisease"));
    let site = object_property("site");
    let reasoner = classify(vec![
        Axiom::subclass_of(heart.clone(), organ.clone()),
        Axiom::subclass_of(
            heart_disease.clone(),
            ClassExpression::intersection([
                disease.clone().into(),
                ClassExpression::some_values_from(site.clone(), heart.into()),
            ]),
        ),
        Axiom::equivalent_classes(
            organ_disease.clone(),
            ClassExpression::intersection([
                disease.clone().into(),
                ClassExpression::some_values_from(site, organ.into()),
            ]),
        ),
    ]);
    let taxonomy = reasoner.taxonomy().unwrap();
    assert!(taxonomy.parents(&heart_disease).unwrap().contains(&organ_disease));
    assert!(taxonomy.parents(&organ_disease).unwrap().contains(&disease));
    assert!(!taxonomy.parents(&heart_disease).unwrap().contains(&disease));
}

#[test]
fn test_equivalent_classes() {
    let (a, b, c) = (class("A"), class("B"), class("C"));
    let reasoner = classify(vec![
        Axiom::equivalent_classes(a.clone(), b.clone()),
        Axiom::subclass_of(c.clone(), a.clone()),
    ]);
    let taxonomy = reasoner.taxonomy().unwrap();
    assert!(taxonomy.equivalents(&a).unwrap().contains(&b));
    assert!(taxonomy.equivalents(&b).unwrap().contains(&a));
    let parents = taxonomy.parents(&c).unwrap();
    assert!(parents.contains(&a) && parents.contains(&b));
}

#[test]
fn test_thing_is_not_in_taxonomy() {
    let a = class("A");
    let reasoner = classify(vec![Axiom::subclass_of(a.clone(), OwlClass::thing())]);
    let taxonomy = reasoner.taxonomy().unwrap();
    assert!(!taxonomy.contains(&OwlClass::thing()));
    assert!(taxonomy.parents(&a).unwrap().is_empty());
}

#[test]
fn test_declared_class_without_axiom() {
    let a = class("A");
    let reasoner = classify(vec![Axiom::DeclareClass(a.clone())]);
    assert!(reasoner.taxonomy().unwrap().contains(&a));
}

// ============================================================================
// Roles
// ============================================================================

#[test]
fn test_role_hierarchy_propagates_links() {
    let (part, component) = (object_property("partOf"), object_property("componentOf"));
    let (wheel, car, car_part) = (class("Wheel"), class("Car"), class("CarPart"));
    let reasoner = classify(vec![
        Axiom::sub_object_property_of(component.clone(), part.clone()),
        Axiom::subclass_of(
            wheel.clone(),
            ClassExpression::some_values_from(component, car.clone().into()),
        ),
        Axiom::equivalent_classes(
            car_part.clone(),
            ClassExpression::some_values_from(part, car.into()),
        ),
    ]);
    assert!(reasoner.taxonomy().unwrap().is_subsumed_by(&wheel, &car_part));
}

#[test]
fn test_transitive_role() {
    let part = object_property("partOf");
    let (finger, hand, arm, arm_part) = (class("Finger"), class("Hand"), class("Arm"), class("ArmPart"));
    let reasoner = classify(vec![
        Axiom::TransitiveObjectProperty(part.clone()),
        Axiom::subclass_of(
            finger.clone(),
            ClassExpression::some_values_from(part.clone(), hand.clone().into()),
        ),
        Axiom::subclass_of(hand, ClassExpression::some_values_from(part.clone(), arm.clone().into())),
        Axiom::equivalent_classes(
            arm_part.clone(),
            ClassExpression::some_values_from(part, arm.into()),
        ),
    ]);
    assert!(reasoner.taxonomy().unwrap().is_subsumed_by(&finger, &arm_part));
}

#[test]
fn test_property_chain() {
    let (located, part) = (object_property("locatedIn"), object_property("partOf"));
    let (lesion, heart, body, body_finding) = (class("Lesion"), class("Heart"), class("Body"), class("BodyFinding"));
    let reasoner = classify(vec![
        Axiom::SubPropertyChainOf {
            property_chain: vec![located.clone(), part.clone()],
            super_property: located.clone(),
        },
        Axiom::subclass_of(
            lesion.clone(),
            ClassExpression::some_values_from(located.clone(), heart.clone().into()),
        ),
        Axiom::subclass_of(heart, ClassExpression::some_values_from(part, body.clone().into())),
        Axiom::equivalent_classes(
            body_finding.clone(),
            ClassExpression::some_values_from(located, body.into()),
        ),
    ]);
    assert!(reasoner.taxonomy().unwrap().is_subsumed_by(&lesion, &body_finding));
}

#[test]
fn test_reflexive_role() {
    let part = object_property("partOf");
    let (heart, heart_part) = (class("Heart"), class("HeartPart"));
    let reasoner = classify(vec![
        Axiom::ReflexiveObjectProperty(part.clone()),
        Axiom::DeclareClass(heart.clone()),
        Axiom::equivalent_classes(
            heart_part.clone(),
            ClassExpression::some_values_from(part, heart.clone().into()),
        ),
    ]);
    assert!(reasoner.taxonomy().unwrap().is_subsumed_by(&heart, &heart_part));
}

#[test]
fn test_invalid_chain() {
    let mut reasoner = ElReasoner::new();
    let result = reasoner.load(
        &mut IterAxiomLoader::new([Axiom::SubPropertyChainOf {
            property_chain: vec![object_property("r")],
            super_property: object_property("s"),
        }]),
        &CancellationToken::new(),
    );
    assert!(matches!(result, Err(LoadingError::InvalidAxiom { .. })));
}

// ============================================================================
// Data values
// ============================================================================

#[test]
fn test_data_has_value() {
    let count = data_property("count");
    let (two, at_least, exact) = (class("Two"), class("Super"), class("Exact"));
    let value = Literal::new_typed_literal("2", xsd::INTEGER);
    let reasoner = classify(vec![
        Axiom::subclass_of(
            two.clone(),
            ClassExpression::has_value(count.clone(), value.clone()),
        ),
        Axiom::equivalent_classes(exact.clone(), ClassExpression::has_value(count, value)),
        Axiom::DeclareClass(at_least),
    ]);
    assert!(reasoner.taxonomy().unwrap().is_subsumed_by(&two, &exact));
    assert!(!reasoner.is_incomplete());
}

#[test]
fn test_restricted_range_marks_incomplete() {
    let count = data_property("count");
    let restricted = DataRange::DatatypeRestriction {
        datatype: xsd::INTEGER.into_owned(),
        facets: vec![(
            NamedNode::new("http://www.w3.org/2001/XMLSchema#minInclusive").unwrap(),
            Literal::new_typed_literal("1", xsd::INTEGER),
        )],
    };
    let reasoner = classify(vec![Axiom::subclass_of(
        class("A"),
        ClassExpression::data_some_values_from(count, restricted),
    )]);
    assert!(reasoner.is_incomplete());
}

// ============================================================================
// Loading and cancellation
// ============================================================================

#[test]
fn test_load_in_small_batches() {
    let axioms = (0..10)
        .map(|i| Axiom::subclass_of(class(&format!("C{}", i + 1)), class(&format!("C{i}"))))
        .collect::<Vec<_>>();
    let mut loader = IterAxiomLoader::new(axioms).with_batch_size(3);
    let mut reasoner = ElReasoner::new();
    assert_eq!(reasoner.load(&mut loader, &CancellationToken::new()).unwrap(), 10);
    assert!(loader.is_loading_finished());
    let taxonomy = reasoner.classify(&CancellationToken::new()).unwrap();
    assert!(taxonomy.is_subsumed_by(&class("C10"), &class("C0")));
}

#[test]
fn test_cancelled_loading() {
    let token = CancellationToken::new();
    token.cancel();
    let mut reasoner = ElReasoner::new();
    let result = reasoner.load(
        &mut IterAxiomLoader::new([Axiom::DeclareClass(class("A"))]),
        &token,
    );
    assert!(matches!(result, Err(LoadingError::Interrupted)));
}

// ============================================================================
// Incremental changes
// ============================================================================

#[test]
fn test_flush_additions() {
    let (a, b, c) = (class("A"), class("B"), class("C"));
    let mut reasoner = classify(vec![Axiom::subclass_of(b.clone(), a.clone())]);
    reasoner.register_addition(Axiom::subclass_of(c.clone(), b.clone()));
    assert!(reasoner.has_pending_changes());
    reasoner.flush(&CancellationToken::new()).unwrap();
    assert!(!reasoner.has_pending_changes());
    assert!(reasoner.taxonomy().unwrap().is_subsumed_by(&c, &a));
}

#[test]
fn test_flush_removal_is_rejected_by_default() {
    let (a, b) = (class("A"), class("B"));
    let axiom = Axiom::subclass_of(b, a);
    let mut reasoner = classify(vec![axiom.clone()]);
    reasoner.register_removal(axiom);
    assert!(matches!(
        reasoner.flush(&CancellationToken::new()),
        Err(ElError::IncrementalUnsupported(_))
    ));
}

#[test]
fn test_flush_net_changes() {
    let (a, b) = (class("A"), class("B"));
    let axiom = Axiom::subclass_of(b.clone(), a.clone());
    let mut reasoner = classify(vec![axiom.clone()]);
    reasoner.register_removal(axiom.clone());
    reasoner.register_addition(axiom);
    reasoner.flush(&CancellationToken::new()).unwrap();
    assert!(reasoner.taxonomy().unwrap().is_subsumed_by(&b, &a));
}

#[test]
fn test_flush_removal_when_allowed() {
    let (a, b) = (class("A"), class("B"));
    let axiom = Axiom::subclass_of(b.clone(), a.clone());
    let mut reasoner = ElReasoner::with_config(ReasonerConfig {
        allow_incremental_removals: true,
        ..ReasonerConfig::default()
    });
    reasoner
        .load(
            &mut IterAxiomLoader::new([axiom.clone(), Axiom::DeclareClass(b.clone())]),
            &CancellationToken::new(),
        )
        .unwrap();
    reasoner.classify(&CancellationToken::new()).unwrap();
    reasoner.register_removal(axiom);
    reasoner.flush(&CancellationToken::new()).unwrap();
    let taxonomy = reasoner.taxonomy().unwrap();
    assert!(!taxonomy.is_subsumed_by(&b, &a));
    assert!(taxonomy.contains(&b));
    assert!(!taxonomy.contains(&a));
    assert_eq!(reasoner.axiom_count(), 1);
}
