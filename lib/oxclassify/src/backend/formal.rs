use crate::backend::{ClassifiedModel, ReasonerBackend, RunContext, RunSummary};
use crate::compiler::CompiledDefinition;
use crate::error::ClassifierError;
use crate::model::{
    ConcreteRole, ConcreteValue, Definition, DefinitionType, IntervalBound, Ontology, Role,
};
use crate::progress::ProgressTracker;
use oxel::{
    Axiom, AxiomLoader, CancellationToken, ClassExpression, DataProperty, DataRange, ElReasoner,
    LoadingError, ObjectProperty, OwlClass, ReasonerConfig, Taxonomy,
};
use oxlogic::{ConceptId, ConcreteOperator, LogicalDefinition, vocab};
use oxrdf::vocab::rdfs;
use oxrdf::{Literal, NamedNode, NamedNodeRef};
use rustc_hash::FxHashSet;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

const CONCEPT_PREFIX: &str = "urn:oxclassify:concept:";
const ROLE_PREFIX: &str = "urn:oxclassify:role:";
const DATA_ROLE_PREFIX: &str = "urn:oxclassify:data-role:";

const MIN_INCLUSIVE: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#minInclusive");
const MIN_EXCLUSIVE: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#minExclusive");
const MAX_INCLUSIVE: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#maxInclusive");
const MAX_EXCLUSIVE: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#maxExclusive");

const LOADER_BATCH_SIZE: usize = 1024;

/// Classifies through formal EL++ axioms streamed to the [`ElReasoner`].
///
/// Ids are encoded as opaque IRIs: `urn:oxclassify:concept:<id>` for concepts,
/// `urn:oxclassify:role:<id>` for role types and `urn:oxclassify:data-role:<id>` for concrete role types.
/// Concrete values other than equalities become restricted data ranges
/// that the reasoner does not fully reason about: the run is then flagged incomplete.
pub struct FormalBackend {
    config: ReasonerConfig,
    model: ClassifiedModel,
    reasoner: Option<ElReasoner>,
    incomplete: bool,
}

impl FormalBackend {
    pub fn new(config: ReasonerConfig) -> Self {
        Self {
            config,
            model: ClassifiedModel::default(),
            reasoner: None,
            incomplete: false,
        }
    }

    /// Reads the taxonomy of the reasoner back into concept ids.
    fn read_taxonomy(&mut self) -> Result<(), ClassifierError> {
        let reasoner = self.reasoner.as_ref().ok_or_else(|| {
            ClassifierError::IncrementalUnsupported("no reasoner has been loaded".into())
        })?;
        let concept_ids = &self.model.data.concept_ids;
        let taxonomy = reasoner
            .taxonomy()
            .map(|taxonomy| {
                taxonomy.filter_map(|class| {
                    decode(class.iri(), CONCEPT_PREFIX).filter(|id| concept_ids.contains(id))
                })
            })
            .unwrap_or_else(|| Taxonomy::from_subsumers(Vec::<(ConceptId, Vec<ConceptId>)>::new()));
        self.incomplete = reasoner.is_incomplete();
        self.model.taxonomy = Some(taxonomy);
        Ok(())
    }
}

impl ReasonerBackend for FormalBackend {
    fn extract_data(
        &mut self,
        definitions: &[LogicalDefinition],
        context: &RunContext,
    ) -> Result<(), ClassifierError> {
        self.model = ClassifiedModel::extract(definitions, context)?;
        self.model.data.by_definition = emit(&self.model.ontology);
        self.reasoner = None;
        self.incomplete = false;
        debug!(
            axioms = self.model.data.axiom_count(),
            "formal axioms emitted"
        );
        Ok(())
    }

    fn load_data(&mut self, context: &RunContext) -> Result<(), ClassifierError> {
        let mut reasoner = ElReasoner::with_config(self.config.clone());
        {
            let mut loader = AxiomDataLoader::new(
                self.model.data.axioms(),
                self.model.data.axiom_count(),
                &context.progress,
            );
            reasoner.load(&mut loader, &context.cancellation_token)?;
        }
        reasoner.classify(&context.cancellation_token)?;
        self.reasoner = Some(reasoner);
        self.read_taxonomy()
    }

    fn compute_inferences(&mut self, context: &RunContext) -> Result<(), ClassifierError> {
        if self.model.taxonomy.is_some() {
            return Ok(());
        }
        match &mut self.reasoner {
            Some(reasoner) => {
                reasoner.classify(&context.cancellation_token)?;
                self.read_taxonomy()
            }
            None => self.load_data(context),
        }
    }

    fn is_incremental_ready(&self) -> bool {
        self.config.incremental && self.reasoner.is_some() && self.model.taxonomy.is_some()
    }

    fn process_incremental(
        &mut self,
        deleted: &[ConceptId],
        updated: Vec<CompiledDefinition>,
        context: &RunContext,
    ) -> Result<(), ClassifierError> {
        if !self.is_incremental_ready() {
            return Err(ClassifierError::IncrementalUnsupported(
                "the formal reasoner is not ready for incremental changes".into(),
            ));
        }
        self.model.apply(deleted, updated);
        let previous = std::mem::replace(
            &mut self.model.data.by_definition,
            emit(&self.model.ontology),
        );
        let Some(reasoner) = &mut self.reasoner else {
            return Err(ClassifierError::IncrementalUnsupported(
                "no reasoner has been loaded".into(),
            ));
        };
        let old = previous.values().flatten().collect::<FxHashSet<_>>();
        let new = self.model.data.axioms().collect::<FxHashSet<_>>();
        let mut removals = 0;
        for axiom in old.difference(&new) {
            reasoner.register_removal((*axiom).clone());
            removals += 1;
        }
        let mut additions = 0;
        for axiom in new.difference(&old) {
            reasoner.register_addition((*axiom).clone());
            additions += 1;
        }
        info!(additions, removals, "incremental axiom changes");
        reasoner.flush(&context.cancellation_token)?;
        self.read_taxonomy()
    }

    fn build_necessary_normal_form(
        &mut self,
        context: &RunContext,
    ) -> Result<(), ClassifierError> {
        self.model.build_normal_forms(context)
    }

    fn concept_count(&self) -> usize {
        self.model.data.concept_ids.len()
    }

    fn equivalents(&self, concept: ConceptId) -> Option<BTreeSet<ConceptId>> {
        self.model.equivalents(concept)
    }

    fn parents(&self, concept: ConceptId) -> Option<BTreeSet<ConceptId>> {
        self.model.parents(concept)
    }

    fn children(&self, concept: ConceptId) -> Option<BTreeSet<ConceptId>> {
        self.model.children(concept)
    }

    fn necessary_normal_form(&self, concept: ConceptId) -> Option<LogicalDefinition> {
        self.model.necessary_normal_form(concept)
    }

    fn summary(&self) -> RunSummary {
        self.model.summary(self.incomplete)
    }
}

/// Streams the emitted axioms to the reasoner, reporting progress on the classification step.
struct AxiomDataLoader<'a, I> {
    axioms: I,
    total: usize,
    loaded: usize,
    progress: &'a ProgressTracker,
    finished: bool,
}

impl<'a, I: Iterator<Item = &'a Axiom>> AxiomDataLoader<'a, I> {
    fn new(axioms: I, total: usize, progress: &'a ProgressTracker) -> Self {
        Self {
            axioms,
            total,
            loaded: 0,
            progress,
            finished: false,
        }
    }
}

impl<'a, I: Iterator<Item = &'a Axiom>> AxiomLoader for AxiomDataLoader<'a, I> {
    fn load(
        &mut self,
        sink: &mut dyn FnMut(Axiom),
        cancellation_token: &CancellationToken,
    ) -> Result<(), LoadingError> {
        for _ in 0..LOADER_BATCH_SIZE {
            if cancellation_token.is_cancelled() {
                return Err(LoadingError::Interrupted);
            }
            let Some(axiom) = self.axioms.next() else {
                self.finished = true;
                return Ok(());
            };
            sink(axiom.clone());
            self.loaded += 1;
            self.progress.items(2, self.loaded, self.total);
        }
        Ok(())
    }

    fn is_loading_finished(&self) -> bool {
        self.finished
    }
}

/// The formal axioms of every entry of the ontology, grouped by id.
fn emit(ontology: &Ontology) -> BTreeMap<ConceptId, Vec<Axiom>> {
    let mut axioms = BTreeMap::<ConceptId, Vec<Axiom>>::new();
    for concept in ontology.concepts() {
        let class = concept_class(concept.id());
        let entry = axioms.entry(concept.id()).or_default();
        entry.push(Axiom::DeclareClass(class.clone()));
        for definition in &concept.definitions {
            let Some(expression) = definition_expression(definition) else {
                continue;
            };
            entry.push(match definition.definition_type {
                DefinitionType::SubConcept => Axiom::subclass_of(class.clone(), expression),
                DefinitionType::EquivalentConcept => {
                    Axiom::equivalent_classes(class.clone(), expression)
                }
            });
        }
        for definition in &concept.gci_definitions {
            if let Some(expression) = definition_expression(definition) {
                entry.push(Axiom::subclass_of(expression, class.clone()));
            }
        }
    }
    for role_type in ontology.role_types() {
        let property = object_property(role_type.id());
        let entry = axioms.entry(role_type.id()).or_default();
        entry.push(Axiom::DeclareObjectProperty(property.clone()));
        if role_type.transitive {
            entry.push(Axiom::TransitiveObjectProperty(property.clone()));
        }
        if role_type.reflexive {
            entry.push(Axiom::ReflexiveObjectProperty(property.clone()));
        }
        for sup in &role_type.supers {
            entry.push(Axiom::sub_object_property_of(
                property.clone(),
                object_property(*sup),
            ));
        }
        if let Some(chain) = &role_type.chain {
            entry.push(Axiom::SubPropertyChainOf {
                property_chain: vec![property.clone(), object_property(chain.successor)],
                super_property: object_property(chain.implies),
            });
        }
    }
    for concrete_role_type in ontology.concrete_role_types() {
        let property = data_property(concrete_role_type.id());
        let entry = axioms.entry(concrete_role_type.id()).or_default();
        entry.push(Axiom::DeclareDataProperty(property.clone()));
        for sup in &concrete_role_type.supers {
            entry.push(Axiom::sub_data_property_of(
                property.clone(),
                data_property(*sup),
            ));
        }
    }
    axioms
}

/// The intersection of the definition content, `None` for empty definitions.
fn definition_expression(definition: &Definition) -> Option<ClassExpression> {
    let operands = definition
        .supers
        .iter()
        .map(|sup| ClassExpression::class(concept_class(*sup)))
        .chain(definition.roles.iter().map(role_expression))
        .chain(definition.concrete_roles.iter().map(concrete_role_expression))
        .chain(definition.role_groups.iter().map(|group| {
            ClassExpression::some_values_from(
                object_property(vocab::ROLE_GROUP),
                intersection(
                    group
                        .roles
                        .iter()
                        .map(role_expression)
                        .chain(group.concrete_roles.iter().map(concrete_role_expression))
                        .collect(),
                ),
            )
        }))
        .collect::<Vec<_>>();
    (!operands.is_empty()).then(|| intersection(operands))
}

fn intersection(mut operands: Vec<ClassExpression>) -> ClassExpression {
    if operands.len() == 1 {
        if let Some(operand) = operands.pop() {
            return operand;
        }
    }
    ClassExpression::ObjectIntersectionOf(operands)
}

fn role_expression(role: &Role) -> ClassExpression {
    ClassExpression::some_values_from(
        object_property(role.role_type),
        ClassExpression::class(concept_class(role.filler)),
    )
}

fn concrete_role_expression(concrete_role: &ConcreteRole) -> ClassExpression {
    let property = data_property(concrete_role.role_type);
    match &concrete_role.value {
        ConcreteValue::Value {
            operator: ConcreteOperator::Equal,
            literal,
        } => ClassExpression::has_value(property, literal.to_literal()),
        ConcreteValue::Value { operator, literal } => {
            let facet = match operator {
                ConcreteOperator::LessThan => MAX_EXCLUSIVE,
                ConcreteOperator::LessThanOrEqual => MAX_INCLUSIVE,
                ConcreteOperator::GreaterThan => MIN_EXCLUSIVE,
                ConcreteOperator::GreaterThanOrEqual | ConcreteOperator::Equal => MIN_INCLUSIVE,
            };
            ClassExpression::data_some_values_from(
                property,
                DataRange::DatatypeRestriction {
                    datatype: literal.value_type().datatype().into_owned(),
                    facets: vec![(facet.into_owned(), literal.to_literal())],
                },
            )
        }
        ConcreteValue::Interval(interval) => {
            let datatype = interval
                .lower
                .as_ref()
                .or(interval.upper.as_ref())
                .map(|bound| bound.value.value_type().datatype().into_owned());
            let mut facets = Vec::new();
            if let Some(lower) = &interval.lower {
                facets.push(facet(lower, MIN_INCLUSIVE, MIN_EXCLUSIVE));
            }
            if let Some(upper) = &interval.upper {
                facets.push(facet(upper, MAX_INCLUSIVE, MAX_EXCLUSIVE));
            }
            ClassExpression::data_some_values_from(
                property,
                match datatype {
                    Some(datatype) => DataRange::DatatypeRestriction { datatype, facets },
                    None => DataRange::datatype(rdfs::LITERAL.into_owned()),
                },
            )
        }
    }
}

fn facet(
    bound: &IntervalBound,
    inclusive: NamedNodeRef<'static>,
    exclusive: NamedNodeRef<'static>,
) -> (NamedNode, Literal) {
    let facet = if bound.inclusive {
        inclusive
    } else {
        exclusive
    };
    (facet.into_owned(), bound.value.to_literal())
}

fn concept_class(id: ConceptId) -> OwlClass {
    OwlClass::new(encode(CONCEPT_PREFIX, id))
}

fn object_property(id: ConceptId) -> ObjectProperty {
    ObjectProperty::new(encode(ROLE_PREFIX, id))
}

fn data_property(id: ConceptId) -> DataProperty {
    DataProperty::new(encode(DATA_ROLE_PREFIX, id))
}

fn encode(prefix: &str, id: ConceptId) -> NamedNode {
    NamedNode::new_unchecked(format!("{prefix}{id}"))
}

fn decode(iri: &NamedNode, prefix: &str) -> Option<ConceptId> {
    iri.as_str().strip_prefix(prefix)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::AxiomCompiler;
    use crate::linker::RoleHierarchyLinker;
    use crate::model::{TypedValue, ValueType};
    use oxlogic::{Bound, LogicNode};
    use oxrdf::vocab::xsd;

    fn id(id: u64) -> ConceptId {
        ConceptId::new(id)
    }

    fn ontology(definitions: impl IntoIterator<Item = LogicalDefinition>) -> Ontology {
        let mut ontology = Ontology::new();
        for definition in definitions {
            ontology.absorb(AxiomCompiler::compile(&definition).unwrap());
        }
        RoleHierarchyLinker::link(&mut ontology);
        ontology
    }

    #[test]
    fn ids_round_trip_through_iris() {
        let class = concept_class(id(42));
        assert_eq!(class.iri().as_str(), "urn:oxclassify:concept:42");
        assert_eq!(decode(class.iri(), CONCEPT_PREFIX), Some(id(42)));
        assert_eq!(decode(object_property(id(42)).iri(), CONCEPT_PREFIX), None);
    }

    #[test]
    fn sufficient_definition_is_an_equivalence() {
        let axioms = emit(&ontology([LogicalDefinition::sufficient(
            id(1),
            LogicNode::concept(id(2)),
        )]));
        assert!(axioms[&id(1)].contains(&Axiom::equivalent_classes(
            concept_class(id(1)),
            concept_class(id(2))
        )));
        assert_eq!(axioms[&id(2)], [Axiom::DeclareClass(concept_class(id(2)))]);
    }

    #[test]
    fn role_type_axioms() {
        let axioms = emit(&ontology([LogicalDefinition::property(
            id(10),
            LogicNode::and([
                LogicNode::concept(id(11)),
                LogicNode::concept(vocab::TRANSITIVE_PROPERTY),
                LogicNode::property_sequence_implication([id(10), id(12)], id(10)),
            ]),
        )]));
        let axioms = &axioms[&id(10)];
        assert!(axioms.contains(&Axiom::TransitiveObjectProperty(object_property(id(10)))));
        assert!(axioms.contains(&Axiom::sub_object_property_of(
            object_property(id(10)),
            object_property(id(11))
        )));
        assert!(axioms.contains(&Axiom::SubPropertyChainOf {
            property_chain: vec![object_property(id(10)), object_property(id(12))],
            super_property: object_property(id(10)),
        }));
        // the synthesized concept of the role type
        assert!(axioms.contains(&Axiom::subclass_of(
            concept_class(id(10)),
            concept_class(id(11))
        )));
    }

    #[test]
    fn concrete_values() {
        let equal = ConcreteRole {
            role_type: id(20),
            value: ConcreteValue::Value {
                operator: ConcreteOperator::Equal,
                literal: TypedValue::parse(ValueType::Integer, "5").unwrap(),
            },
        };
        assert_eq!(
            concrete_role_expression(&equal),
            ClassExpression::has_value(
                data_property(id(20)),
                Literal::new_typed_literal("5", xsd::INTEGER)
            )
        );
        let definition = LogicalDefinition::necessary(
            id(1),
            LogicNode::and([LogicNode::interval_role(
                id(21),
                Some(Bound::inclusive(Literal::new_typed_literal("1", xsd::LONG))),
                Some(Bound::exclusive(Literal::new_typed_literal("9", xsd::LONG))),
            )]),
        );
        let axioms = emit(&ontology([definition]));
        assert!(axioms[&id(1)].contains(&Axiom::subclass_of(
            concept_class(id(1)),
            ClassExpression::data_some_values_from(
                data_property(id(21)),
                DataRange::DatatypeRestriction {
                    datatype: xsd::LONG.into_owned(),
                    facets: vec![
                        (
                            MIN_INCLUSIVE.into_owned(),
                            Literal::new_typed_literal("1", xsd::LONG)
                        ),
                        (
                            MAX_EXCLUSIVE.into_owned(),
                            Literal::new_typed_literal("9", xsd::LONG)
                        ),
                    ],
                }
            )
        )));
    }
}
