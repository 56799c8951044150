//! Binding configuration carried by a [`State`](crate::State).

/// Tunable properties of the adaptation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindProperty {
    /// 1 = reject surplus arguments, 0 = ignore them
    ExtraArguments,
    /// 1 = overload candidates must accept the argument types, 0 = arity only
    OverloadTypeCheck,
    /// Maximum number of slots on the value stack
    MaxStackDepth,
}

impl BindProperty {
    pub fn default_value(&self) -> usize {
        match self {
            BindProperty::ExtraArguments => 1,
            BindProperty::OverloadTypeCheck => 1,
            BindProperty::MaxStackDepth => 10000,
        }
    }
}

/// What a single-candidate callback does with arguments past its declared
/// parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtraArguments {
    Ignore,
    #[default]
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindConfig {
    extra_arguments: ExtraArguments,
    overload_type_check: bool,
    max_stack_depth: usize,
}

impl BindConfig {
    pub fn new() -> Self {
        Self {
            extra_arguments: ExtraArguments::default(),
            overload_type_check: BindProperty::OverloadTypeCheck.default_value() != 0,
            max_stack_depth: BindProperty::MaxStackDepth.default_value(),
        }
    }

    pub fn with_extra_arguments(mut self, policy: ExtraArguments) -> Self {
        self.extra_arguments = policy;
        self
    }

    pub fn with_overload_type_check(mut self, enabled: bool) -> Self {
        self.overload_type_check = enabled;
        self
    }

    pub fn with_max_stack_depth(mut self, depth: usize) -> Self {
        self.max_stack_depth = depth;
        self
    }

    /// Set a property from its numeric encoding.
    pub fn set_property(&mut self, property: BindProperty, value: usize) {
        match property {
            BindProperty::ExtraArguments => {
                self.extra_arguments = if value == 0 {
                    ExtraArguments::Ignore
                } else {
                    ExtraArguments::Reject
                };
            }
            BindProperty::OverloadTypeCheck => self.overload_type_check = value != 0,
            BindProperty::MaxStackDepth => self.max_stack_depth = value,
        }
    }

    /// Read a property in its numeric encoding.
    pub fn property(&self, property: BindProperty) -> usize {
        match property {
            BindProperty::ExtraArguments => match self.extra_arguments {
                ExtraArguments::Ignore => 0,
                ExtraArguments::Reject => 1,
            },
            BindProperty::OverloadTypeCheck => self.overload_type_check as usize,
            BindProperty::MaxStackDepth => self.max_stack_depth,
        }
    }

    pub fn extra_arguments(&self) -> ExtraArguments {
        self.extra_arguments
    }

    pub fn overload_type_check(&self) -> bool {
        self.overload_type_check
    }

    pub fn max_stack_depth(&self) -> usize {
        self.max_stack_depth
    }
}

impl Default for BindConfig {
    fn default() -> Self {
        Self::new()
    }
}
