//! CSS Selectors
//!
//! Parsing and right-to-left matching of selector lists against the arena
//! tree. Supported: type, universal, `#id`, `.class`, attribute selectors
//! with every CSS3 matcher, the four combinators, and the structural and
//! form pseudo-classes listed in [`PseudoClass`].

use crate::{DomTree, ElementData, NodeData, NodeId};

/// Selector parsing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected {found} at position {position} in selector '{selector}'")]
    UnexpectedToken {
        selector: String,
        position: usize,
        found: String,
    },
    #[error("unsupported pseudo-class ':{0}'")]
    UnsupportedPseudo(String),
    #[error("invalid :nth-* expression '{0}'")]
    InvalidNth(String),
}

/// A parsed, comma-separated selector list
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

/// Compound selectors joined by combinators, stored left to right
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    compounds: Vec<Compound>,
    /// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
}

/// Sequence of simple selectors applying to one element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Compound {
    components: Vec<SelectorComponent>,
}

/// A component of a selector
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Universal selector *
    Universal,
    /// Type selector (tag name)
    Type(String),
    /// ID selector #id
    Id(String),
    /// Class selector .class
    Class(String),
    /// Attribute selector [attr], [attr=value], etc.
    Attribute(AttributeSelector),
    /// Pseudo-class :first-child, :not(), etc.
    PseudoClass(PseudoClass),
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        let (matcher, value) = match (&self.matcher, value) {
            (_, None) => return false,
            (None, Some(_)) => return true,
            (Some(matcher), Some(value)) => (matcher, value),
        };
        let fold = |s: &str| {
            if self.case_insensitive {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };
        let value = fold(value);

        match matcher {
            AttributeMatcher::Exact(expected) => value == fold(expected),
            AttributeMatcher::Contains(expected) => {
                let expected = fold(expected);
                value.split_whitespace().any(|w| w == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold(expected);
                value == expected || value.starts_with(&format!("{expected}-"))
            }
            // An empty operand never matches for the substring family
            AttributeMatcher::Prefix(expected) => {
                !expected.is_empty() && value.starts_with(&fold(expected))
            }
            AttributeMatcher::Suffix(expected) => {
                !expected.is_empty() && value.ends_with(&fold(expected))
            }
            AttributeMatcher::Substring(expected) => {
                !expected.is_empty() && value.contains(&fold(expected))
            }
        }
    }
}

/// Pseudo-class type
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(NthExpression),
    NthLastChild(NthExpression),
    NthOfType(NthExpression),
    NthLastOfType(NthExpression),
    Not(Box<SelectorList>),
    Is(Box<SelectorList>),
    Checked,
    Disabled,
    Enabled,
}

/// An+B expression for :nth-* selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthExpression {
    /// Coefficient (A in An+B)
    pub a: i32,
    /// Offset (B in An+B)
    pub b: i32,
}

impl NthExpression {
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Parse from string like "2n+1", "odd", "even", "3"
    pub fn parse(s: &str) -> Option<Self> {
        let s: String = s.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_lowercase();

        match s.as_str() {
            "odd" => return Some(Self::new(2, 1)),
            "even" => return Some(Self::new(2, 0)),
            _ => {}
        }

        if let Ok(n) = s.parse::<i32>() {
            return Some(Self::new(0, n));
        }

        let n_pos = s.find('n')?;
        let a = match &s[..n_pos] {
            "" | "+" => 1,
            "-" => -1,
            a_str => a_str.parse().ok()?,
        };
        let rest = &s[n_pos + 1..];
        let b = if rest.is_empty() {
            0
        } else {
            // "+3" parses directly; require an explicit sign
            if !rest.starts_with(['+', '-']) {
                return None;
            }
            rest.parse().ok()?
        };
        Some(Self::new(a, b))
    }

    /// Check if index n (1-based) matches this expression
    pub fn matches(&self, n: i32) -> bool {
        if self.a == 0 {
            return n == self.b;
        }
        let diff = n - self.b;
        diff % self.a == 0 && diff / self.a >= 0
    }
}

// ----------------------------------------------------------------------
// Matching
// ----------------------------------------------------------------------

impl SelectorList {
    /// Parse a selector list
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        if source.trim().is_empty() {
            return Err(SelectorError::Empty);
        }
        let mut parser = Parser::new(source);
        let list = parser.parse_list(false)?;
        if let Some(c) = parser.peek() {
            return Err(parser.unexpected(c));
        }
        Ok(list)
    }

    /// Whether element `id` matches any selector in the list
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        tree.is_element(id) && self.selectors.iter().any(|s| s.matches(tree, id))
    }

    /// All matching elements strictly below `scope`, in document order
    pub fn query_all(&self, tree: &DomTree, scope: NodeId) -> Vec<NodeId> {
        tree.descendants(scope)
            .map(|(id, _)| id)
            .filter(|&id| self.matches(tree, id))
            .collect()
    }

    /// Nearest ancestor-or-self of `id` that matches
    pub fn closest(&self, tree: &DomTree, id: NodeId) -> Option<NodeId> {
        tree.ancestors_and_self(id).find(|&a| self.matches(tree, a))
    }
}

impl ComplexSelector {
    fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        self.match_at(tree, self.compounds.len() - 1, id)
    }

    fn match_at(&self, tree: &DomTree, idx: usize, id: NodeId) -> bool {
        if !self.compounds[idx].matches(tree, id) {
            return false;
        }
        if idx == 0 {
            return true;
        }

        let prev = idx - 1;
        match self.combinators[prev] {
            Combinator::Child => tree
                .parent_element(id)
                .is_some_and(|p| self.match_at(tree, prev, p)),
            Combinator::Descendant => std::iter::successors(tree.parent_element(id), |&p| {
                tree.parent_element(p)
            })
            .any(|a| self.match_at(tree, prev, a)),
            Combinator::NextSibling => tree
                .prev_element_sibling(id)
                .is_some_and(|s| self.match_at(tree, prev, s)),
            Combinator::SubsequentSibling => std::iter::successors(
                tree.prev_element_sibling(id),
                |&s| tree.prev_element_sibling(s),
            )
            .any(|s| self.match_at(tree, prev, s)),
        }
    }
}

impl Compound {
    fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some(element) = tree.element(id) else {
            return false;
        };
        self.components
            .iter()
            .all(|component| match_component(component, tree, id, element))
    }
}

fn match_component(
    component: &SelectorComponent,
    tree: &DomTree,
    id: NodeId,
    element: &ElementData,
) -> bool {
    match component {
        SelectorComponent::Universal => true,
        SelectorComponent::Type(tag) => element.tag_name.eq_ignore_ascii_case(tag),
        SelectorComponent::Id(expected) => element.id() == Some(expected.as_str()),
        SelectorComponent::Class(class) => element.has_class(class),
        SelectorComponent::Attribute(attr) => attr.matches(element.get_attr(&attr.name)),
        SelectorComponent::PseudoClass(pseudo) => match_pseudo_class(pseudo, tree, id, element),
    }
}

/// Position (1-based) and count among element siblings, optionally of the same tag
fn sibling_position(tree: &DomTree, id: NodeId, same_type: Option<&str>) -> (usize, usize) {
    let keep = |s: NodeId| same_type.is_none_or(|tag| tree.tag_name(s) == Some(tag));
    let before = std::iter::successors(tree.prev_element_sibling(id), |&s| tree.prev_element_sibling(s))
        .filter(|&s| keep(s))
        .count();
    let after = std::iter::successors(tree.next_element_sibling(id), |&s| tree.next_element_sibling(s))
        .filter(|&s| keep(s))
        .count();
    (before + 1, before + after + 1)
}

fn match_pseudo_class(pseudo: &PseudoClass, tree: &DomTree, id: NodeId, element: &ElementData) -> bool {
    let tag = Some(element.tag_name.as_str());
    match pseudo {
        PseudoClass::Root => tree.parent(id) == Some(NodeId::ROOT),
        PseudoClass::Empty => tree.children(id).all(|(_, child)| match &child.data {
            NodeData::Comment(_) => true,
            NodeData::Text(text) => text.is_empty(),
            _ => false,
        }),
        PseudoClass::FirstChild => sibling_position(tree, id, None).0 == 1,
        PseudoClass::LastChild => {
            let (index, count) = sibling_position(tree, id, None);
            index == count
        }
        PseudoClass::OnlyChild => sibling_position(tree, id, None).1 == 1,
        PseudoClass::FirstOfType => sibling_position(tree, id, tag).0 == 1,
        PseudoClass::LastOfType => {
            let (index, count) = sibling_position(tree, id, tag);
            index == count
        }
        PseudoClass::OnlyOfType => sibling_position(tree, id, tag).1 == 1,
        PseudoClass::NthChild(expr) => expr.matches(sibling_position(tree, id, None).0 as i32),
        PseudoClass::NthLastChild(expr) => {
            let (index, count) = sibling_position(tree, id, None);
            expr.matches((count - index + 1) as i32)
        }
        PseudoClass::NthOfType(expr) => expr.matches(sibling_position(tree, id, tag).0 as i32),
        PseudoClass::NthLastOfType(expr) => {
            let (index, count) = sibling_position(tree, id, tag);
            expr.matches((count - index + 1) as i32)
        }
        PseudoClass::Not(list) => !list.matches(tree, id),
        PseudoClass::Is(list) => list.matches(tree, id),
        PseudoClass::Checked => match element.tag_name.as_str() {
            "input" => element.attrs.contains("checked"),
            "option" => element.attrs.contains("selected"),
            _ => false,
        },
        PseudoClass::Disabled => is_disableable(element) && element.attrs.contains("disabled"),
        PseudoClass::Enabled => is_disableable(element) && !element.attrs.contains("disabled"),
    }
}

fn is_disableable(element: &ElementData) -> bool {
    matches!(
        element.tag_name.as_str(),
        "input" | "textarea" | "select" | "button" | "option" | "fieldset"
    )
}

// ----------------------------------------------------------------------
// Parsing
// ----------------------------------------------------------------------

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.unexpected(c)),
            None => Err(self.unexpected_end()),
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn unexpected(&self, found: char) -> SelectorError {
        SelectorError::UnexpectedToken {
            selector: self.source.to_string(),
            position: self.pos,
            found: format!("'{found}'"),
        }
    }

    fn unexpected_end(&self) -> SelectorError {
        SelectorError::UnexpectedToken {
            selector: self.source.to_string(),
            position: self.pos,
            found: "end of input".to_string(),
        }
    }

    fn parse_list(&mut self, nested: bool) -> Result<SelectorList, SelectorError> {
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            selectors.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                }
                Some(')') if nested => break,
                None => break,
                Some(c) => return Err(self.unexpected(c)),
            }
        }
        Ok(SelectorList { selectors })
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut compounds = vec![self.parse_required_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(',' | ')') | None => break,
                Some(_) if had_space => Combinator::Descendant,
                Some(c) => return Err(self.unexpected(c)),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_whitespace();
            }
            combinators.push(combinator);
            compounds.push(self.parse_required_compound()?);
        }

        Ok(ComplexSelector { compounds, combinators })
    }

    fn parse_required_compound(&mut self) -> Result<Compound, SelectorError> {
        let compound = self.parse_compound()?;
        if compound.components.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => self.unexpected_end(),
            });
        }
        Ok(compound)
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut components = Vec::new();

        if self.eat('*') {
            components.push(SelectorComponent::Universal);
        } else if self.peek().is_some_and(is_ident_start) {
            let tag = self.parse_ident()?;
            components.push(SelectorComponent::Type(tag.to_ascii_lowercase()));
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    components.push(SelectorComponent::Id(self.parse_name()?));
                }
                Some('.') => {
                    self.pos += 1;
                    components.push(SelectorComponent::Class(self.parse_name()?));
                }
                Some('[') => {
                    self.pos += 1;
                    components.push(SelectorComponent::Attribute(self.parse_attribute()?));
                }
                Some(':') => {
                    self.pos += 1;
                    components.push(SelectorComponent::PseudoClass(self.parse_pseudo()?));
                }
                _ => break,
            }
        }

        Ok(Compound { components })
    }

    /// Identifier that must start like a CSS ident
    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(c) if is_ident_start(c) => self.parse_name(),
            Some(c) => Err(self.unexpected(c)),
            None => Err(self.unexpected_end()),
        }
    }

    /// Run of name characters, honouring backslash escapes
    fn parse_name(&mut self) -> Result<String, SelectorError> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                match self.bump() {
                    Some(escaped) => name.push(escaped),
                    None => return Err(self.unexpected_end()),
                }
            } else if is_name_char(c) {
                name.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => self.unexpected_end(),
            });
        }
        Ok(name)
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.parse_name()?.to_ascii_lowercase();
        self.skip_whitespace();

        if self.eat(']') {
            return Ok(AttributeSelector { name, matcher: None, case_insensitive: false });
        }

        let op = match self.bump() {
            Some('=') => None,
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                self.expect('=')?;
                Some(c)
            }
            Some(c) => {
                self.pos -= 1;
                return Err(self.unexpected(c));
            }
            None => return Err(self.unexpected_end()),
        };
        self.skip_whitespace();
        let value = self.parse_attribute_value()?;
        self.skip_whitespace();

        let mut case_insensitive = false;
        if matches!(self.peek(), Some('i' | 'I')) {
            self.pos += 1;
            case_insensitive = true;
            self.skip_whitespace();
        } else if matches!(self.peek(), Some('s' | 'S')) {
            self.pos += 1;
            self.skip_whitespace();
        }
        self.expect(']')?;

        let matcher = match op {
            None => AttributeMatcher::Exact(value),
            Some('~') => AttributeMatcher::Contains(value),
            Some('|') => AttributeMatcher::DashMatch(value),
            Some('^') => AttributeMatcher::Prefix(value),
            Some('$') => AttributeMatcher::Suffix(value),
            _ => AttributeMatcher::Substring(value),
        };

        Ok(AttributeSelector { name, matcher: Some(matcher), case_insensitive })
    }

    fn parse_attribute_value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some(c) if c == quote => break,
                        Some('\\') => match self.bump() {
                            Some(escaped) => value.push(escaped),
                            None => return Err(self.unexpected_end()),
                        },
                        Some(c) => value.push(c),
                        None => return Err(self.unexpected_end()),
                    }
                }
                Ok(value)
            }
            _ => self.parse_name(),
        }
    }

    fn parse_pseudo(&mut self) -> Result<PseudoClass, SelectorError> {
        if self.peek() == Some(':') {
            // Pseudo-elements never match an element node
            self.pos += 1;
            let name = self.parse_name()?;
            return Err(SelectorError::UnsupportedPseudo(format!(":{name}")));
        }

        let name = self.parse_ident()?.to_ascii_lowercase();
        let pseudo = match name.as_str() {
            "root" => PseudoClass::Root,
            "empty" => PseudoClass::Empty,
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "only-child" => PseudoClass::OnlyChild,
            "first-of-type" => PseudoClass::FirstOfType,
            "last-of-type" => PseudoClass::LastOfType,
            "only-of-type" => PseudoClass::OnlyOfType,
            "checked" => PseudoClass::Checked,
            "disabled" => PseudoClass::Disabled,
            "enabled" => PseudoClass::Enabled,
            "nth-child" => PseudoClass::NthChild(self.parse_nth_argument()?),
            "nth-last-child" => PseudoClass::NthLastChild(self.parse_nth_argument()?),
            "nth-of-type" => PseudoClass::NthOfType(self.parse_nth_argument()?),
            "nth-last-of-type" => PseudoClass::NthLastOfType(self.parse_nth_argument()?),
            "not" => PseudoClass::Not(Box::new(self.parse_nested_list()?)),
            "is" | "where" | "matches" => PseudoClass::Is(Box::new(self.parse_nested_list()?)),
            _ => return Err(SelectorError::UnsupportedPseudo(name)),
        };
        Ok(pseudo)
    }

    fn parse_nth_argument(&mut self) -> Result<NthExpression, SelectorError> {
        self.expect('(')?;
        let start = self.pos;
        while self.peek().is_some_and(|c| c != ')') {
            self.pos += 1;
        }
        let raw: String = self.chars[start..self.pos].iter().collect();
        self.expect(')')?;
        NthExpression::parse(&raw).ok_or_else(|| SelectorError::InvalidNth(raw.trim().to_string()))
    }

    fn parse_nested_list(&mut self) -> Result<SelectorList, SelectorError> {
        self.expect('(')?;
        let list = self.parse_list(true)?;
        self.expect(')')?;
        Ok(list)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}
