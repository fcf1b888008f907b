use crate::axiom::Axiom;
use crate::engine::{AtomId, Engine, Expr, RoleId};
use crate::entity::{DataProperty, ObjectProperty, OwlClass};
use crate::error::LoadingError;
use crate::expression::{ClassExpression, DataRange};
use oxrdf::Literal;
use rustc_hash::FxHashMap;

/// A data value filler, reasoned about as an opaque atom.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DataValue {
    Literal(Literal),
    Range(DataRange),
}

/// Translation of OWL entities to [`Engine`] identifiers.
#[derive(Debug, Default)]
pub(super) struct EntityIndex {
    classes: FxHashMap<OwlClass, AtomId>,
    class_atoms: FxHashMap<AtomId, OwlClass>,
    object_properties: FxHashMap<ObjectProperty, RoleId>,
    data_properties: FxHashMap<DataProperty, RoleId>,
    data_values: FxHashMap<DataValue, AtomId>,
    /// Set when a filler is a restricted data range
    incomplete: bool,
}

impl EntityIndex {
    pub(super) fn add_axiom(
        &mut self,
        engine: &mut Engine,
        axiom: &Axiom,
    ) -> Result<(), LoadingError> {
        match axiom {
            Axiom::SubClassOf {
                sub_class,
                super_class,
            } => {
                let sub = self.expr(engine, sub_class);
                let sup = self.expr(engine, super_class);
                engine.add_subsumption(&sub, &sup);
            }
            Axiom::EquivalentClasses(classes) => {
                let [first, rest @ ..] = classes.as_slice() else {
                    return Err(invalid(axiom, "at least two class expressions are required"));
                };
                if rest.is_empty() {
                    return Err(invalid(axiom, "at least two class expressions are required"));
                }
                let first = self.expr(engine, first);
                for other in rest {
                    let other = self.expr(engine, other);
                    engine.add_equivalence(&first, &other);
                }
            }
            Axiom::SubObjectPropertyOf {
                sub_property,
                super_property,
            } => {
                let sub = self.object_property(engine, sub_property);
                let sup = self.object_property(engine, super_property);
                engine.add_sub_role(sub, sup);
            }
            Axiom::SubPropertyChainOf {
                property_chain,
                super_property,
            } => {
                if property_chain.len() < 2 {
                    return Err(invalid(axiom, "a property chain has at least two elements"));
                }
                let chain = property_chain
                    .iter()
                    .map(|property| self.object_property(engine, property))
                    .collect::<Vec<_>>();
                let sup = self.object_property(engine, super_property);
                engine.add_role_chain(&chain, sup);
            }
            Axiom::TransitiveObjectProperty(property) => {
                let role = self.object_property(engine, property);
                engine.add_transitive(role);
            }
            Axiom::ReflexiveObjectProperty(property) => {
                let role = self.object_property(engine, property);
                engine.add_reflexive(role);
            }
            Axiom::SubDataPropertyOf {
                sub_property,
                super_property,
            } => {
                let sub = self.data_property(engine, sub_property);
                let sup = self.data_property(engine, super_property);
                engine.add_sub_role(sub, sup);
            }
            Axiom::DeclareClass(class) => {
                if !class.is_thing() {
                    self.class(engine, class);
                }
            }
            Axiom::DeclareObjectProperty(property) => {
                self.object_property(engine, property);
            }
            Axiom::DeclareDataProperty(property) => {
                self.data_property(engine, property);
            }
        }
        Ok(())
    }

    fn expr(&mut self, engine: &mut Engine, expression: &ClassExpression) -> Expr {
        match expression {
            ClassExpression::Class(class) if class.is_thing() => Expr::Top,
            ClassExpression::Class(class) => Expr::Atom(self.class(engine, class)),
            ClassExpression::ObjectIntersectionOf(operands) => Expr::And(
                operands
                    .iter()
                    .map(|operand| self.expr(engine, operand))
                    .collect(),
            ),
            ClassExpression::ObjectSomeValuesFrom { property, filler } => {
                let role = self.object_property(engine, property);
                Expr::exists(role, self.expr(engine, filler))
            }
            ClassExpression::DataHasValue { property, value } => {
                let role = self.data_property(engine, property);
                let value = self.data_value(engine, DataValue::Literal(value.clone()));
                Expr::exists(role, value.into())
            }
            ClassExpression::DataSomeValuesFrom { property, filler } => {
                if filler.is_restricted() {
                    self.incomplete = true;
                }
                let role = self.data_property(engine, property);
                let value = self.data_value(engine, DataValue::Range(filler.clone()));
                Expr::exists(role, value.into())
            }
        }
    }

    fn class(&mut self, engine: &mut Engine, class: &OwlClass) -> AtomId {
        if let Some(atom) = self.classes.get(class) {
            return *atom;
        }
        let atom = engine.new_atom();
        self.classes.insert(class.clone(), atom);
        self.class_atoms.insert(atom, class.clone());
        atom
    }

    fn object_property(&mut self, engine: &mut Engine, property: &ObjectProperty) -> RoleId {
        *self
            .object_properties
            .entry(property.clone())
            .or_insert_with(|| engine.new_role())
    }

    fn data_property(&mut self, engine: &mut Engine, property: &DataProperty) -> RoleId {
        *self
            .data_properties
            .entry(property.clone())
            .or_insert_with(|| engine.new_role())
    }

    fn data_value(&mut self, engine: &mut Engine, value: DataValue) -> AtomId {
        *self
            .data_values
            .entry(value)
            .or_insert_with(|| engine.new_atom())
    }

    pub(super) fn classes(&self) -> impl Iterator<Item = (&OwlClass, AtomId)> {
        self.classes.iter().map(|(class, atom)| (class, *atom))
    }

    pub(super) fn class_of(&self, atom: AtomId) -> Option<&OwlClass> {
        self.class_atoms.get(&atom)
    }

    pub(super) fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub(super) fn is_incomplete(&self) -> bool {
        self.incomplete
    }
}

fn invalid(axiom: &Axiom, message: &str) -> LoadingError {
    LoadingError::InvalidAxiom {
        axiom: axiom.to_string(),
        message: message.into(),
    }
}
