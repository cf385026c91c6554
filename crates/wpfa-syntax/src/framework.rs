//! Well-known framework metadata.
//!
//! The analyzer recognizes framework entities by fully qualified name, so any host
//! whose symbol table names them the same way works. `FrameworkSymbols` records the
//! metadata-only symbols `CompilationBuilder` installs for them.

use crate::base::SymbolId;

/// Fully qualified names the analyzer matches on.
pub mod names {
    pub const OBJECT: &str = "System.Object";
    pub const STRING: &str = "System.String";
    pub const NULLABLE: &str = "System.Nullable";
    pub const SYSTEM_TYPE: &str = "System.Type";

    pub const DEPENDENCY_OBJECT: &str = "System.Windows.DependencyObject";
    pub const DEPENDENCY_PROPERTY: &str = "System.Windows.DependencyProperty";
    pub const DEPENDENCY_PROPERTY_KEY: &str = "System.Windows.DependencyPropertyKey";
    pub const PROPERTY_METADATA: &str = "System.Windows.PropertyMetadata";

    pub const INOTIFY_PROPERTY_CHANGED: &str = "System.ComponentModel.INotifyPropertyChanged";
    pub const PROPERTY_CHANGED_EVENT_HANDLER: &str =
        "System.ComponentModel.PropertyChangedEventHandler";
    pub const PROPERTY_CHANGED_EVENT_ARGS: &str = "System.ComponentModel.PropertyChangedEventArgs";

    pub const REGISTER: &str = "Register";
    pub const REGISTER_READ_ONLY: &str = "RegisterReadOnly";
    pub const REGISTER_ATTACHED: &str = "RegisterAttached";
    pub const REGISTER_ATTACHED_READ_ONLY: &str = "RegisterAttachedReadOnly";
    pub const GET_VALUE: &str = "GetValue";
    pub const SET_VALUE: &str = "SetValue";
    pub const SET_CURRENT_VALUE: &str = "SetCurrentValue";
    /// `DependencyPropertyKey.DependencyProperty`.
    pub const KEY_DESCRIPTOR_MEMBER: &str = "DependencyProperty";
    pub const PROPERTY_CHANGED_EVENT: &str = "PropertyChanged";
    pub const INVOKE: &str = "Invoke";
    pub const EMPTY: &str = "Empty";

    /// Name raised for an indexer change.
    pub const INDEXER_NAME: &str = "Item[]";
}

/// Metadata symbols installed by `CompilationBuilder::new`.
#[derive(Clone, Debug)]
pub struct FrameworkSymbols {
    pub object: SymbolId,
    pub string: SymbolId,
    pub boolean: SymbolId,
    pub int32: SymbolId,
    pub double: SymbolId,
    pub system_type: SymbolId,
    /// `System.Nullable<T>` generic definition.
    pub nullable: SymbolId,
    /// `System.Collections.ObjectModel.Collection<T>` generic definition.
    pub collection: SymbolId,
    /// `System.Collections.ObjectModel.ObservableCollection<T>` generic definition.
    pub observable_collection: SymbolId,
    pub string_empty: SymbolId,
    /// `static bool object.Equals(object, object)`.
    pub object_equals: SymbolId,
    /// `static bool object.ReferenceEquals(object, object)`.
    pub reference_equals: SymbolId,

    pub dependency_object: SymbolId,
    pub ui_element: SymbolId,
    pub framework_element: SymbolId,
    pub dependency_property: SymbolId,
    pub dependency_property_key: SymbolId,
    pub property_metadata: SymbolId,
    pub dependency_property_changed_event_args: SymbolId,
    pub register: SymbolId,
    pub register_read_only: SymbolId,
    pub register_attached: SymbolId,
    pub register_attached_read_only: SymbolId,
    /// `DependencyPropertyKey.DependencyProperty`.
    pub key_descriptor: SymbolId,
    /// `DependencyObject.GetValue(DependencyProperty)`.
    pub get_value: SymbolId,
    /// `DependencyObject.SetValue(DependencyProperty, object)`.
    pub set_value: SymbolId,
    /// `DependencyObject.SetValue(DependencyPropertyKey, object)`.
    pub set_value_key: SymbolId,
    pub set_current_value: SymbolId,
    /// `PropertyMetadata(object defaultValue)`.
    pub property_metadata_ctor: SymbolId,
    /// `PropertyMetadata(object defaultValue, PropertyChangedCallback callback)`.
    pub property_metadata_ctor_callback: SymbolId,

    pub inotify_property_changed: SymbolId,
    pub property_changed_event_handler: SymbolId,
    /// `PropertyChangedEventHandler.Invoke(object, PropertyChangedEventArgs)`.
    pub handler_invoke: SymbolId,
    pub property_changed_event_args: SymbolId,
    /// `PropertyChangedEventArgs(string propertyName)`.
    pub property_changed_event_args_ctor: SymbolId,
}

impl Default for FrameworkSymbols {
    fn default() -> Self {
        Self {
            object: SymbolId::NONE,
            string: SymbolId::NONE,
            boolean: SymbolId::NONE,
            int32: SymbolId::NONE,
            double: SymbolId::NONE,
            system_type: SymbolId::NONE,
            nullable: SymbolId::NONE,
            collection: SymbolId::NONE,
            observable_collection: SymbolId::NONE,
            string_empty: SymbolId::NONE,
            object_equals: SymbolId::NONE,
            reference_equals: SymbolId::NONE,
            dependency_object: SymbolId::NONE,
            ui_element: SymbolId::NONE,
            framework_element: SymbolId::NONE,
            dependency_property: SymbolId::NONE,
            dependency_property_key: SymbolId::NONE,
            property_metadata: SymbolId::NONE,
            dependency_property_changed_event_args: SymbolId::NONE,
            register: SymbolId::NONE,
            register_read_only: SymbolId::NONE,
            register_attached: SymbolId::NONE,
            register_attached_read_only: SymbolId::NONE,
            key_descriptor: SymbolId::NONE,
            get_value: SymbolId::NONE,
            set_value: SymbolId::NONE,
            set_value_key: SymbolId::NONE,
            set_current_value: SymbolId::NONE,
            property_metadata_ctor: SymbolId::NONE,
            property_metadata_ctor_callback: SymbolId::NONE,
            inotify_property_changed: SymbolId::NONE,
            property_changed_event_handler: SymbolId::NONE,
            handler_invoke: SymbolId::NONE,
            property_changed_event_args: SymbolId::NONE,
            property_changed_event_args_ctor: SymbolId::NONE,
        }
    }
}
