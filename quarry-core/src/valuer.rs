use crate::{Entity, Error, FieldDef, Model, Result, Rows, ScanTarget, Value};
use std::{
    any::{TypeId, type_name},
    iter::zip,
    ops::{Deref, DerefMut},
};

/// Reads entity fields by their Rust name.
pub trait FieldAccess {
    fn field(&self, name: &str) -> Result<Value>;
}

/// Binds the current row of a result set into an entity.
pub trait Valuer: FieldAccess {
    fn set_columns(&mut self, rows: &mut dyn Rows) -> Result<()>;
}

/// Strategy used to move values between entities and statements.
///
/// Both strategies produce the same results, they only differ in how fields are reached.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ValueMapper {
    /// Goes through [`Entity::field`] and [`Entity::set_field`], scanning each cell into an
    /// intermediate [`Value`] first.
    Portable,
    /// Reads and writes fields in place at `entity address + field offset`.
    #[default]
    Offset,
}

impl ValueMapper {
    pub fn reader<'a, E: Entity>(&self, model: &'a Model, entity: &'a E) -> Box<dyn FieldAccess + 'a> {
        match self {
            ValueMapper::Portable => Box::new(ReflectValue::new(model, entity)),
            ValueMapper::Offset => Box::new(OffsetValue::new(model, entity)),
        }
    }

    pub fn writer<'a, E: Entity>(
        &self,
        model: &'a Model,
        entity: &'a mut E,
    ) -> Box<dyn Valuer + 'a> {
        match self {
            ValueMapper::Portable => Box::new(ReflectValue::new(model, entity)),
            ValueMapper::Offset => Box::new(OffsetValue::new(model, entity)),
        }
    }
}

fn unknown_column(column: &str) -> Error {
    Error::UnknownColumn(column.to_string())
}

/// Portable binding through the by-name accessors of the entity.
pub struct ReflectValue<'a, P> {
    model: &'a Model,
    entity: P,
}

impl<'a, P> ReflectValue<'a, P> {
    pub fn new(model: &'a Model, entity: P) -> Self {
        Self { model, entity }
    }
}

impl<'a, E: Entity, P: Deref<Target = E>> FieldAccess for ReflectValue<'a, P> {
    fn field(&self, name: &str) -> Result<Value> {
        if self.model.field(name).is_none() {
            return Err(Error::UnknownField(name.to_string()));
        }
        self.entity
            .field(name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))
    }
}

impl<'a, E: Entity, P: DerefMut<Target = E>> Valuer for ReflectValue<'a, P> {
    fn set_columns(&mut self, rows: &mut dyn Rows) -> Result<()> {
        let fields = rows
            .columns()
            .iter()
            .map(|column| self.model.column(column).ok_or_else(|| unknown_column(column)))
            .collect::<Result<Vec<_>>>()?;
        let mut values: Vec<Value> = fields.iter().map(|f| f.value.clone()).collect();
        {
            let mut targets: Vec<&mut dyn ScanTarget> =
                values.iter_mut().map(|v| v as &mut dyn ScanTarget).collect();
            rows.scan(&mut targets)?;
        }
        for (field, value) in zip(fields, values) {
            self.entity.set_field(field.name, value)?;
        }
        Ok(())
    }
}

/// Direct binding at the field offsets.
///
/// The model only maps names. Offsets and accessors always come from `E::entity_def()`, and the
/// model must describe `E` itself, this is checked before touching memory.
pub struct OffsetValue<'a, P> {
    model: &'a Model,
    entity: P,
}

impl<'a, P> OffsetValue<'a, P> {
    pub fn new(model: &'a Model, entity: P) -> Self {
        Self { model, entity }
    }
}

fn check_model<E: Entity>(model: &Model) -> Result<()> {
    if !model.is_model_of(TypeId::of::<E>()) {
        return Err(Error::msg(format!(
            "Model of table `{}` does not describe {}",
            model.table_name,
            type_name::<E>()
        )));
    }
    Ok(())
}

/// Descriptor of the field `name` of `E`.
fn field_def<E: Entity>(name: &str) -> Result<&'static FieldDef> {
    E::entity_def()
        .fields
        .iter()
        .find(|f| f.name == name)
        .ok_or_else(|| Error::UnknownField(name.to_string()))
}

impl<'a, E: Entity, P: Deref<Target = E>> FieldAccess for OffsetValue<'a, P> {
    fn field(&self, name: &str) -> Result<Value> {
        check_model::<E>(self.model)?;
        let field = self
            .model
            .field(name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))?;
        let def = field_def::<E>(field.name)?;
        let base = (&*self.entity as *const E).cast::<u8>();
        // SAFETY: `def` comes from the descriptor of E, whose offsets and readers are guaranteed
        // by the unsafe Entity implementation
        Ok(unsafe { (def.read)(base.add(def.offset)) })
    }
}

struct OffsetSlot {
    def: &'static FieldDef,
    ptr: *mut u8,
}

impl ScanTarget for OffsetSlot {
    fn prototype(&self) -> Value {
        self.def.value.clone()
    }

    fn assign(&mut self, value: Value) -> Result<()> {
        // SAFETY: `ptr` addresses the field described by `def` inside an entity that is
        // mutably borrowed for the whole scan
        unsafe { (self.def.write)(self.ptr, value) }
    }
}

impl<'a, E: Entity, P: DerefMut<Target = E>> Valuer for OffsetValue<'a, P> {
    fn set_columns(&mut self, rows: &mut dyn Rows) -> Result<()> {
        check_model::<E>(self.model)?;
        let base = (&mut *self.entity as *mut E).cast::<u8>();
        let mut slots = rows
            .columns()
            .iter()
            .map(|column| {
                let field = self.model.column(column).ok_or_else(|| unknown_column(column))?;
                let def = field_def::<E>(field.name)?;
                Ok(OffsetSlot {
                    def,
                    // SAFETY: the offset comes from the descriptor of E
                    ptr: unsafe { base.add(def.offset) },
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let mut targets: Vec<&mut dyn ScanTarget> = slots
            .iter_mut()
            .map(|slot| slot as &mut dyn ScanTarget)
            .collect();
        rows.scan(&mut targets)
    }
}
