use rustc_hash::FxHashMap;
use std::sync::{Arc, OnceLock};

use crate::core::expr::{Expr, NodeTag};
use crate::core::settings::Settings;
use crate::simplification::patterns::{Bindings, Pattern};

/// Core trait for all simplification rules
pub(crate) trait Rule: Send + Sync {
    fn name(&self) -> &'static str;
    fn priority(&self) -> i32;
    fn category(&self) -> RuleCategory;

    /// Which node kinds this rule can apply to.
    /// Rules are ONLY checked against nodes with one of these tags.
    fn applies_to(&self) -> &[NodeTag];

    fn apply(&self, expr: &Arc<Expr>, context: &RuleContext) -> Option<Expr>;

    /// Shape the rule matches, for rules written as templates.
    fn template(&self) -> Option<&Pattern> {
        None
    }
}

/// Categories of simplification rules
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) enum RuleCategory {
    // Part of InnerSimplify
    Numeric,
    Identity,
    Power,
    Logarithm,
    Sign,
    Function,
    Boolean,
    // Search-only alternatives
    NegativePowers,
    Fractions,
    Expansion,
    Collection,
    Factoring,
    Trigonometric,
    TrigonometricExpansion,
    LogarithmCollapse,
}

impl RuleCategory {
    pub(crate) const fn rule_set(self) -> RuleSet {
        match self {
            Self::Numeric
            | Self::Identity
            | Self::Power
            | Self::Logarithm
            | Self::Sign
            | Self::Function
            | Self::Boolean => RuleSet::Inner,
            Self::NegativePowers
            | Self::Fractions
            | Self::Expansion
            | Self::Collection
            | Self::Factoring
            | Self::Trigonometric
            | Self::TrigonometricExpansion
            | Self::LogarithmCollapse => RuleSet::Search(self),
        }
    }
}

/// A group of rules applied together.
///
/// `Inner` is the local normalization run to a fixed point; each search
/// category is applied on its own to produce an alternative form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) enum RuleSet {
    Inner,
    Search(RuleCategory),
}

/// Priority ranges:
/// - 100: constant folding
/// - 80-99: identities and cancellation (x/x=1, x-x=0, ...)
/// - 50-79: power, logarithm and sign normalization
///
/// Context passed to rules during application
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct RuleContext {
    pub(crate) depth: usize,
    pub(crate) settings: Settings,
}

impl RuleContext {
    pub(crate) const fn new(settings: Settings) -> Self {
        Self { depth: 0, settings }
    }

    pub(crate) const fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }
}

type Condition = fn(&Bindings) -> bool;
type Rewrite = fn(&Bindings) -> Option<Expr>;

/// A rule written as `template -> replacement`, with an optional side condition.
pub(crate) struct PatternRule {
    name: &'static str,
    priority: i32,
    category: RuleCategory,
    template: Pattern,
    tag: Option<NodeTag>,
    condition: Option<Condition>,
    rewrite: Rewrite,
}

impl PatternRule {
    pub(crate) fn new(
        name: &'static str,
        priority: i32,
        category: RuleCategory,
        template: Pattern,
        rewrite: Rewrite,
    ) -> Self {
        let tag = template.root_tag();
        Self {
            name,
            priority,
            category,
            template,
            tag,
            condition: None,
            rewrite,
        }
    }

    pub(crate) fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub(crate) fn boxed(self) -> Arc<dyn Rule> {
        Arc::new(self)
    }
}

impl Rule for PatternRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn category(&self) -> RuleCategory {
        self.category
    }

    fn applies_to(&self) -> &[NodeTag] {
        self.tag.as_slice()
    }

    fn apply(&self, expr: &Arc<Expr>, _context: &RuleContext) -> Option<Expr> {
        let bindings = self.template.matches(expr)?;
        if let Some(condition) = self.condition
            && !condition(&bindings)
        {
            return None;
        }
        (self.rewrite)(&bindings)
    }

    fn template(&self) -> Option<&Pattern> {
        Some(&self.template)
    }
}

/// Numeric folding
pub(crate) mod numeric;

/// Algebraic simplification rules
pub(crate) mod algebraic;

/// Trigonometric and other function rules
pub(crate) mod trigonometric;

/// Logarithm rules
pub(crate) mod exponential;

/// Boolean and comparison rules
pub(crate) mod logic;

/// Every node tag that can carry children or be folded.
pub(crate) const ARITHMETIC_TAGS: &[NodeTag] = &[
    NodeTag::Sum,
    NodeTag::Minus,
    NodeTag::Mul,
    NodeTag::Div,
    NodeTag::Pow,
    NodeTag::Log,
];

/// Rule registry, indexed by rule set and node tag
pub(crate) struct RuleRegistry {
    pub(crate) rules: Vec<Arc<dyn Rule>>,
    rules_by_node: FxHashMap<(RuleSet, NodeTag), Vec<Arc<dyn Rule>>>,
}

impl RuleRegistry {
    pub(crate) fn new() -> Self {
        Self {
            rules: Vec::new(),
            rules_by_node: FxHashMap::default(),
        }
    }

    pub(crate) fn load_all_rules(&mut self) {
        self.rules.extend(numeric::get_numeric_rules());
        self.rules.extend(algebraic::get_algebraic_rules());
        self.rules.extend(trigonometric::get_trigonometric_rules());
        self.rules.extend(exponential::get_exponential_rules());
        self.rules.extend(logic::get_logic_rules());
    }

    /// Sort by priority (higher first, stable among equals) and build the index
    pub(crate) fn order_by_priority(&mut self) {
        self.rules.sort_by_key(|r| std::cmp::Reverse(r.priority()));
        self.build_index();
    }

    fn build_index(&mut self) {
        self.rules_by_node.clear();
        for rule in &self.rules {
            let set = rule.category().rule_set();
            for &tag in rule.applies_to() {
                self.rules_by_node
                    .entry((set, tag))
                    .or_default()
                    .push(Arc::clone(rule));
            }
        }
    }

    /// Rules of `set` that can fire on a node tagged `tag`, in application order
    #[inline]
    pub(crate) fn rules_for(&self, set: RuleSet, tag: NodeTag) -> &[Arc<dyn Rule>] {
        self.rules_by_node
            .get(&(set, tag))
            .map_or(&[], Vec::as_slice)
    }

    /// The process-wide catalogue, built on first use.
    pub(crate) fn global() -> &'static Self {
        static REGISTRY: OnceLock<RuleRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            let mut registry = Self::new();
            registry.load_all_rules();
            registry.order_by_priority();
            log::debug!("loaded {} simplification rules", registry.rules.len());
            registry
        })
    }
}
