use crate::backend::{ClassifiedModel, ReasonerBackend, RunContext, RunSummary};
use crate::compiler::CompiledDefinition;
use crate::error::ClassifierError;
use crate::model::{ConcreteRole, ConcreteValue, Definition, DefinitionType, Ontology, Role};
use oxel::{AtomId, Engine, Expr, RoleId, Taxonomy};
use oxlogic::{ConceptId, ConcreteOperator, LogicalDefinition};
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use tracing::info;

/// Classifies the native model with the [`oxel::Engine`].
///
/// Concepts become atoms and role types become roles. Each distinct concrete value becomes an atom of its own,
/// so values are only compared for equality: a model using ranges or intervals is flagged incomplete.
#[derive(Default)]
pub struct NativeBackend {
    model: ClassifiedModel,
    incomplete: bool,
}

impl NativeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn classify(&mut self, context: &RunContext) -> Result<(), ClassifierError> {
        context.check_cancelled()?;
        let mut translation = EngineTranslation::new(&self.model.ontology);
        translation.translate();
        let EngineTranslation {
            mut engine,
            atoms,
            incomplete,
            ..
        } = translation;
        let statistics = engine
            .saturate(&context.cancellation_token)
            .map_err(|_| ClassifierError::Cancelled)?;
        let concepts = atoms
            .iter()
            .map(|(concept, atom)| (*atom, *concept))
            .collect::<FxHashMap<_, _>>();
        let taxonomy = Taxonomy::from_subsumers(self.model.data.concept_ids.iter().filter_map(
            |id| {
                let atom = *atoms.get(id)?;
                Some((
                    *id,
                    engine
                        .subsumers(atom)
                        .filter_map(|sup| concepts.get(&sup).copied())
                        .collect::<Vec<_>>(),
                ))
            },
        ));
        info!(
            concepts = taxonomy.len(),
            subsumptions = statistics.subsumptions,
            steps = statistics.steps,
            "native classification done"
        );
        self.incomplete = incomplete;
        self.model.taxonomy = Some(taxonomy);
        Ok(())
    }
}

impl ReasonerBackend for NativeBackend {
    fn extract_data(
        &mut self,
        definitions: &[LogicalDefinition],
        context: &RunContext,
    ) -> Result<(), ClassifierError> {
        self.model = ClassifiedModel::extract(definitions, context)?;
        self.incomplete = false;
        Ok(())
    }

    fn load_data(&mut self, context: &RunContext) -> Result<(), ClassifierError> {
        self.classify(context)
    }

    fn compute_inferences(&mut self, context: &RunContext) -> Result<(), ClassifierError> {
        if self.model.taxonomy.is_some() {
            return Ok(());
        }
        self.classify(context)
    }

    fn is_incremental_ready(&self) -> bool {
        self.model.taxonomy.is_some()
    }

    fn process_incremental(
        &mut self,
        deleted: &[ConceptId],
        updated: Vec<CompiledDefinition>,
        context: &RunContext,
    ) -> Result<(), ClassifierError> {
        if !self.is_incremental_ready() {
            return Err(ClassifierError::IncrementalUnsupported(
                "the native backend has not been classified".into(),
            ));
        }
        self.model.apply(deleted, updated);
        self.classify(context)
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

/// Translation of an [`Ontology`] into [`Engine`] axioms.
struct EngineTranslation<'a> {
    ontology: &'a Ontology,
    engine: Engine,
    atoms: FxHashMap<ConceptId, AtomId>,
    roles: FxHashMap<ConceptId, RoleId>,
    concrete_roles: FxHashMap<ConceptId, RoleId>,
    values: FxHashMap<ConcreteValue, AtomId>,
    group_role: RoleId,
    incomplete: bool,
}

impl<'a> EngineTranslation<'a> {
    fn new(ontology: &'a Ontology) -> Self {
        let mut engine = Engine::new();
        let group_role = engine.new_role();
        Self {
            ontology,
            engine,
            atoms: FxHashMap::default(),
            roles: FxHashMap::default(),
            concrete_roles: FxHashMap::default(),
            values: FxHashMap::default(),
            group_role,
            incomplete: false,
        }
    }

    fn translate(&mut self) {
        let ontology = self.ontology;
        for concept in ontology.concepts() {
            self.atom(concept.id());
        }
        for role_type in ontology.role_types() {
            let role = self.role(role_type.id());
            if role_type.transitive {
                self.engine.add_transitive(role);
            }
            if role_type.reflexive {
                self.engine.add_reflexive(role);
            }
            for sup in &role_type.supers {
                let sup = self.role(*sup);
                self.engine.add_sub_role(role, sup);
            }
            if let Some(chain) = &role_type.chain {
                let successor = self.role(chain.successor);
                let implies = self.role(chain.implies);
                self.engine.add_role_chain(&[role, successor], implies);
            }
        }
        for concrete_role_type in ontology.concrete_role_types() {
            let role = self.concrete_role(concrete_role_type.id());
            for sup in &concrete_role_type.supers {
                let sup = self.concrete_role(*sup);
                self.engine.add_sub_role(role, sup);
            }
        }
        for concept in ontology.concepts() {
            let atom = Expr::Atom(self.atom(concept.id()));
            for definition in &concept.definitions {
                if definition.is_empty() {
                    continue;
                }
                let expression = self.definition(definition);
                match definition.definition_type {
                    DefinitionType::SubConcept => {
                        self.engine.add_subsumption(&atom, &expression);
                    }
                    DefinitionType::EquivalentConcept => {
                        self.engine.add_equivalence(&atom, &expression);
                    }
                }
            }
            for definition in &concept.gci_definitions {
                if !definition.is_empty() {
                    let expression = self.definition(definition);
                    self.engine.add_subsumption(&expression, &atom);
                }
            }
        }
    }

    fn definition(&mut self, definition: &Definition) -> Expr {
        let mut conjuncts = Vec::new();
        for sup in &definition.supers {
            conjuncts.push(Expr::Atom(self.atom(*sup)));
        }
        for role in &definition.roles {
            conjuncts.push(self.role_expression(role));
        }
        for concrete_role in &definition.concrete_roles {
            conjuncts.push(self.concrete_role_expression(concrete_role));
        }
        for group in &definition.role_groups {
            let members = group
                .roles
                .iter()
                .map(|role| self.role_expression(role))
                .collect::<Vec<_>>();
            let concrete_members = group
                .concrete_roles
                .iter()
                .map(|concrete_role| self.concrete_role_expression(concrete_role))
                .collect::<Vec<_>>();
            conjuncts.push(Expr::exists(
                self.group_role,
                conjunction(members.into_iter().chain(concrete_members).collect()),
            ));
        }
        conjunction(conjuncts)
    }

    fn role_expression(&mut self, role: &Role) -> Expr {
        Expr::exists(self.role(role.role_type), Expr::Atom(self.atom(role.filler)))
    }

    fn concrete_role_expression(&mut self, concrete_role: &ConcreteRole) -> Expr {
        let role = self.concrete_role(concrete_role.role_type);
        let value = self.value(&concrete_role.value);
        Expr::exists(role, Expr::Atom(value))
    }

    fn atom(&mut self, concept: ConceptId) -> AtomId {
        *self
            .atoms
            .entry(concept)
            .or_insert_with(|| self.engine.new_atom())
    }

    fn role(&mut self, role_type: ConceptId) -> RoleId {
        *self
            .roles
            .entry(role_type)
            .or_insert_with(|| self.engine.new_role())
    }

    fn concrete_role(&mut self, concrete_role_type: ConceptId) -> RoleId {
        *self
            .concrete_roles
            .entry(concrete_role_type)
            .or_insert_with(|| self.engine.new_role())
    }

    fn value(&mut self, value: &ConcreteValue) -> AtomId {
        if !matches!(
            value,
            ConcreteValue::Value {
                operator: ConcreteOperator::Equal,
                ..
            }
        ) {
            self.incomplete = true;
        }
        if let Some(atom) = self.values.get(value) {
            return *atom;
        }
        let atom = self.engine.new_atom();
        self.values.insert(value.clone(), atom);
        atom
    }
}

fn conjunction(mut conjuncts: Vec<Expr>) -> Expr {
    if conjuncts.len() == 1 {
        if let Some(conjunct) = conjuncts.pop() {
            return conjunct;
        }
    }
    Expr::And(conjuncts)
}
