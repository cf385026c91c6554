//! Recognition of framework types and members by fully qualified name.

use crate::classifier::RegistrationKind;
use crate::context::AnalysisContext;
use wpfa_syntax::framework::names;
use wpfa_syntax::{SymbolId, SymbolKind, TypeId};

impl AnalysisContext<'_> {
    fn is_type(&self, ty: TypeId, full_name: &str) -> bool {
        self.model
            .type_symbol(ty)
            .is_some_and(|sym| self.model.is_type_named(sym, full_name))
    }

    /// Member `name` of kind `kind` declared on the framework type `owner`.
    fn is_member_of(&self, member: SymbolId, owner: &str, name: &str, kind: SymbolKind) -> bool {
        self.symbol(member).is_some_and(|symbol| {
            symbol.kind == kind
                && symbol.name == name
                && self.model.is_type_named(symbol.containing_type, owner)
        })
    }

    // =========================================================================
    // Types
    // =========================================================================

    pub fn is_dependency_property_type(&self, ty: TypeId) -> bool {
        self.is_type(ty, names::DEPENDENCY_PROPERTY)
    }

    pub fn is_dependency_property_key_type(&self, ty: TypeId) -> bool {
        self.is_type(ty, names::DEPENDENCY_PROPERTY_KEY)
    }

    pub fn is_dependency_object_type(&self, ty: TypeId) -> bool {
        self.model
            .type_is_or_derives_from(ty, names::DEPENDENCY_OBJECT)
    }

    pub fn is_property_metadata_type(&self, ty: TypeId) -> bool {
        self.model
            .type_is_or_derives_from(ty, names::PROPERTY_METADATA)
    }

    pub fn is_event_handler_type(&self, ty: TypeId) -> bool {
        self.is_type(ty, names::PROPERTY_CHANGED_EVENT_HANDLER)
    }

    pub fn is_event_args_type(&self, ty: TypeId) -> bool {
        self.model
            .type_is_or_derives_from(ty, names::PROPERTY_CHANGED_EVENT_ARGS)
    }

    pub fn is_string_type(&self, ty: TypeId) -> bool {
        self.is_type(ty, names::STRING)
    }

    pub fn is_nullable_definition(&self, sym: SymbolId) -> bool {
        self.model.is_type_named(sym, names::NULLABLE)
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// The `PropertyChanged` event of an `INotifyPropertyChanged` implementation.
    pub fn is_property_changed_event(&self, sym: SymbolId) -> bool {
        self.symbol(sym).is_some_and(|symbol| {
            symbol.kind == SymbolKind::Event
                && symbol.name == names::PROPERTY_CHANGED_EVENT
                && self.is_event_handler_type(symbol.ty)
        })
    }

    /// `PropertyChangedEventHandler.Invoke`.
    pub fn is_handler_invoke(&self, sym: SymbolId) -> bool {
        self.is_member_of(
            sym,
            names::PROPERTY_CHANGED_EVENT_HANDLER,
            names::INVOKE,
            SymbolKind::Method,
        )
    }

    /// `new PropertyChangedEventArgs(string)`.
    pub fn is_event_args_constructor(&self, sym: SymbolId) -> bool {
        self.symbol(sym).is_some_and(|symbol| {
            symbol.kind == SymbolKind::Constructor
                && self
                    .symbol(symbol.containing_type)
                    .is_some_and(|owner| self.is_event_args_type(owner.ty))
        })
    }

    /// `string.Empty`.
    pub fn is_string_empty(&self, sym: SymbolId) -> bool {
        self.is_member_of(sym, names::STRING, names::EMPTY, SymbolKind::Field)
    }

    /// `DependencyPropertyKey.DependencyProperty`.
    pub fn is_key_descriptor_member(&self, sym: SymbolId) -> bool {
        self.is_member_of(
            sym,
            names::DEPENDENCY_PROPERTY_KEY,
            names::KEY_DESCRIPTOR_MEMBER,
            SymbolKind::Property,
        )
    }

    /// `DependencyObject.GetValue`.
    pub fn is_get_value(&self, sym: SymbolId) -> bool {
        self.is_member_of(
            sym,
            names::DEPENDENCY_OBJECT,
            names::GET_VALUE,
            SymbolKind::Method,
        )
    }

    /// `DependencyObject.SetValue` or `DependencyObject.SetCurrentValue`.
    pub fn is_set_value(&self, sym: SymbolId) -> bool {
        self.is_member_of(
            sym,
            names::DEPENDENCY_OBJECT,
            names::SET_VALUE,
            SymbolKind::Method,
        ) || self.is_member_of(
            sym,
            names::DEPENDENCY_OBJECT,
            names::SET_CURRENT_VALUE,
            SymbolKind::Method,
        )
    }

    /// Registration method on `DependencyProperty`, by name.
    pub fn registration_kind(&self, sym: SymbolId) -> Option<RegistrationKind> {
        let symbol = self.symbol(sym)?;
        if symbol.kind != SymbolKind::Method
            || !symbol.is_static()
            || !self
                .model
                .is_type_named(symbol.containing_type, names::DEPENDENCY_PROPERTY)
        {
            return None;
        }
        RegistrationKind::from_method_name(&symbol.name)
    }
}
