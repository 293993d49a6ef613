use unsynn::*;

keyword! {
    KStruct = "struct";
    pub(crate) KEnum = "enum";
    pub(crate) KUnion = "union";
    KPub = "pub";
}

unsynn! {
    /// Visibility: `pub`, `pub(...)`, or nothing.
    pub(crate) enum Vis {
        /// `pub(crate)`, `pub(super)`, `pub(in path)`
        PubIn(Cons<KPub, ParenthesisGroup>),
        /// `pub`
        Pub(KPub),
    }

    /// An outer attribute: `#[...]`.
    pub(crate) struct Attribute {
        /// The `#`
        pub(crate) _pound: Pound,
        /// Everything between the brackets
        pub(crate) body: BracketGroup,
    }

    /// The input handed to the derive.
    pub(crate) enum DeriveInput {
        /// A struct of any kind
        Struct(StructDecl),
        /// Any enum; always rejected
        Enum(Cons<Vec<Attribute>, Option<Vis>, KEnum, Ident>),
        /// Any union; always rejected
        Union(Cons<Vec<Attribute>, Option<Vis>, KUnion, Ident>),
    }

    /// `struct Name<...> where ... { ... }`, `struct Name(...);` or `struct Name;`
    pub(crate) struct StructDecl {
        /// Outer attributes, including doc comments
        pub(crate) attributes: Vec<Attribute>,
        /// Visibility
        pub(crate) vis: Option<Vis>,
        /// `struct`
        pub(crate) _kw_struct: KStruct,
        /// The type name
        pub(crate) name: Ident,
        /// Generic parameters and where clauses, if any
        pub(crate) generics: Any<Cons<Except<StructBody>, TokenTree>>,
        /// The body
        pub(crate) body: StructBody,
    }

    /// The three struct body forms.
    pub(crate) enum StructBody {
        /// `{ field: Type, ... }`
        Named(BraceGroup),
        /// `(Type, ...);`
        Tuple(Cons<ParenthesisGroup, Semicolon>),
        /// `;`
        Unit(Semicolon),
    }

    /// One named field, split out of a [`StructBody::Named`] body.
    pub(crate) struct FieldDecl {
        /// Outer attributes, including doc comments
        pub(crate) attributes: Vec<Attribute>,
        /// Visibility
        pub(crate) vis: Option<Vis>,
        /// The field name
        pub(crate) name: Ident,
        /// `:`
        pub(crate) _colon: Colon,
        /// The field type, everything up to the end of the field
        pub(crate) typ: TokenStream,
    }
}

impl Attribute {
    /// The tokens between the brackets.
    pub(crate) fn tokens(&self) -> TokenStream {
        self.body.0.stream()
    }

    /// If this is a `#[model(...)]` attribute, the tokens inside the parentheses.
    pub(crate) fn model_args(&self) -> Option<TokenStream> {
        let mut tokens = self.tokens().into_iter();
        match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(TokenTree::Ident(ident)), Some(TokenTree::Group(group)), None)
                if ident == "model" && group.delimiter() == proc_macro2::Delimiter::Parenthesis =>
            {
                Some(group.stream())
            }
            _ => None,
        }
    }

    /// `true` for `#[model]` or `#[model = ...]`, which are never valid.
    pub(crate) fn is_malformed_model(&self) -> bool {
        let mut tokens = self.tokens().into_iter();
        matches!(tokens.next(), Some(TokenTree::Ident(ident)) if ident == "model")
            && self.model_args().is_none()
    }
}

/// Split `tokens` at commas that are not nested inside `<...>`.
///
/// Brackets, braces and parentheses arrive as single groups, so angle
/// brackets are the only nesting that has to be tracked by hand. The `>` of
/// a `->` is not a closing bracket. Empty pieces (such as the one after a
/// trailing comma) are dropped.
pub(crate) fn split_top_level_commas(tokens: TokenStream) -> Vec<TokenStream> {
    let mut pieces = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0usize;
    let mut after_dash = false;

    for tt in tokens {
        if let TokenTree::Punct(punct) = &tt {
            match punct.as_char() {
                '<' => depth += 1,
                '>' if !after_dash => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    if !current.is_empty() {
                        pieces.push(current.drain(..).collect());
                    }
                    after_dash = false;
                    continue;
                }
                _ => {}
            }
            after_dash = punct.as_char() == '-';
        } else {
            after_dash = false;
        }
        current.push(tt);
    }
    if !current.is_empty() {
        pieces.push(current.into_iter().collect());
    }
    pieces
}
