/*! The resolved AST the generator consumes.
 *
 * Nodes live in flat arenas and refer to each other by index. Upstream passes have already filled
 * the annotations: every declaration knows its scope, every expression its static type, every
 * identifier its declaration and every `break`/`continue` its enclosing loop. The generator only
 * reads this tree.
 */

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

macro_rules! arena_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

arena_id!(StmtId, "stmt");
arena_id!(ExprId, "expr");
arena_id!(VarId, "var");
arena_id!(FuncId, "func");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinType {
    Void,
    Boolean,
    Integer,
    String,
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuiltinType::Void => "void",
            BuiltinType::Boolean => "boolean",
            BuiltinType::Integer => "integer",
            BuiltinType::String => "string",
        };
        f.write_str(name)
    }
}

/// Where a declaration lives, as decided by scope resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclScope {
    TopLevel,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarKind {
    Variable,
    Parameter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    pub ty: BuiltinType,
    #[serde(default)]
    pub init: Option<ExprId>,
    pub scope: DeclScope,
    #[serde(default = "default_var_kind")]
    pub kind: VarKind,
}

fn default_var_kind() -> VarKind {
    VarKind::Variable
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<VarId>,
    /// `None` when the source declares no return type.
    #[serde(default)]
    pub return_type: Option<BuiltinType>,
    pub body: StmtId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub node: ExprKind,
    /// Static type inferred upstream; `void` for calls to void functions.
    pub ty: BuiltinType,
}

impl Expr {
    /// Literal nodes only: `-5` is a unary expression, not a literal.
    pub fn is_literal(&self) -> bool {
        matches!(
            self.node,
            ExprKind::BooleanLiteral { .. }
                | ExprKind::IntegerLiteral { .. }
                | ExprKind::StringLiteral { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExprKind {
    BooleanLiteral {
        value: bool,
    },
    IntegerLiteral {
        value: i64,
    },
    StringLiteral {
        value: String,
    },
    Identifier {
        name: String,
        decl: VarId,
    },
    Call {
        callee: String,
        args: Vec<ExprId>,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Minus,
    Plus,
    Not,
    BitNot,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            UnaryOp::Minus => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Assign,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulus,
    ShiftLeft,
    ShiftRight,
    LessThan,
    GreaterThan,
    LessThanEquals,
    GreaterThanEquals,
    Equals,
    NotEquals,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,
    PlusAssign,
    MinusAssign,
    MultiplyAssign,
    DivideAssign,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Assign => "=",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulus => "%",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
            BinaryOp::LessThan => "<",
            BinaryOp::GreaterThan => ">",
            BinaryOp::LessThanEquals => "<=",
            BinaryOp::GreaterThanEquals => ">=",
            BinaryOp::Equals => "==",
            BinaryOp::NotEquals => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::PlusAssign => "+=",
            BinaryOp::MinusAssign => "-=",
            BinaryOp::MultiplyAssign => "*=",
            BinaryOp::DivideAssign => "/=",
        }
    }

    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            BinaryOp::LessThan
                | BinaryOp::GreaterThan
                | BinaryOp::LessThanEquals
                | BinaryOp::GreaterThanEquals
        )
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, BinaryOp::Equals | BinaryOp::NotEquals)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stmt {
    Expr {
        expr: ExprId,
    },
    Compound {
        stmts: Vec<StmtId>,
    },
    VarDecl {
        vars: Vec<VarId>,
    },
    FunctionDecl {
        func: FuncId,
    },
    If {
        condition: ExprId,
        then_body: StmtId,
        #[serde(default)]
        else_body: Option<StmtId>,
    },
    While {
        condition: ExprId,
        body: StmtId,
    },
    For {
        #[serde(default)]
        init: ForInit,
        #[serde(default)]
        condition: Option<ExprId>,
        #[serde(default)]
        updates: Vec<ExprId>,
        body: StmtId,
    },
    /// `target` is the enclosing `while` or `for`.
    Continue {
        target: StmtId,
    },
    Break {
        target: StmtId,
    },
    Return {
        #[serde(default)]
        value: Option<ExprId>,
    },
}

/// A `for` initializer: one declaration statement or a list of expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForInit {
    Decl(StmtId),
    Exprs(Vec<ExprId>),
}

impl Default for ForInit {
    fn default() -> Self {
        ForInit::Exprs(Vec::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub filename: String,
    /// Top-level statements in source order, function declarations included.
    pub items: Vec<StmtId>,
    pub stmts: Vec<Stmt>,
    pub exprs: Vec<Expr>,
    pub vars: Vec<VarDecl>,
    pub functions: Vec<FunctionDecl>,
}

impl Module {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    pub fn stmt(&self, id: StmtId) -> Option<&Stmt> {
        self.stmts.get(id.index())
    }

    pub fn expr(&self, id: ExprId) -> Option<&Expr> {
        self.exprs.get(id.index())
    }

    pub fn var(&self, id: VarId) -> Option<&VarDecl> {
        self.vars.get(id.index())
    }

    pub fn function(&self, id: FuncId) -> Option<&FunctionDecl> {
        self.functions.get(id.index())
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Signature handed out by [`AstBuilder::declare_function`] until the body is attached.
#[derive(Debug, Clone)]
pub struct PendingFunction {
    pub name: String,
    pub params: Vec<VarId>,
    pub return_type: Option<BuiltinType>,
}

/// Builds a resolved module directly, annotating nodes the way scope, reference and type
/// resolution would.
///
/// Loops that contain `break`/`continue` are built in two steps: [`AstBuilder::begin_loop`]
/// reserves the loop's id so the jumps can name it, `finish_while`/`finish_for` fill it in.
#[derive(Debug, Default)]
pub struct AstBuilder {
    module: Module,
    return_types: HashMap<String, BuiltinType>,
}

impl AstBuilder {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            module: Module::new(filename),
            return_types: HashMap::new(),
        }
    }

    pub fn finish(self) -> Module {
        self.module
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    fn push_expr(&mut self, node: ExprKind, ty: BuiltinType) -> ExprId {
        let id = ExprId(self.module.exprs.len() as u32);
        self.module.exprs.push(Expr { node, ty });
        id
    }

    fn push_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId(self.module.stmts.len() as u32);
        self.module.stmts.push(stmt);
        id
    }

    fn push_var(&mut self, decl: VarDecl) -> VarId {
        let id = VarId(self.module.vars.len() as u32);
        self.module.vars.push(decl);
        id
    }

    fn type_of(&self, expr: ExprId) -> BuiltinType {
        self.module
            .expr(expr)
            .map(|e| e.ty)
            .unwrap_or(BuiltinType::Void)
    }

    /// Append a statement to the module's top level.
    pub fn item(&mut self, stmt: StmtId) -> StmtId {
        self.module.items.push(stmt);
        stmt
    }

    pub fn bool_lit(&mut self, value: bool) -> ExprId {
        self.push_expr(ExprKind::BooleanLiteral { value }, BuiltinType::Boolean)
    }

    pub fn int_lit(&mut self, value: i64) -> ExprId {
        self.push_expr(ExprKind::IntegerLiteral { value }, BuiltinType::Integer)
    }

    pub fn str_lit(&mut self, value: impl Into<String>) -> ExprId {
        self.push_expr(
            ExprKind::StringLiteral {
                value: value.into(),
            },
            BuiltinType::String,
        )
    }

    pub fn ident(&mut self, decl: VarId) -> ExprId {
        let (name, ty) = self
            .module
            .var(decl)
            .map(|v| (v.name.clone(), v.ty))
            .unwrap_or_else(|| (String::new(), BuiltinType::Void));
        self.push_expr(ExprKind::Identifier { name, decl }, ty)
    }

    /// Calls to names never declared through this builder are typed `void`.
    pub fn call(&mut self, callee: impl Into<String>, args: Vec<ExprId>) -> ExprId {
        let callee = callee.into();
        let ty = self
            .return_types
            .get(&callee)
            .copied()
            .unwrap_or(BuiltinType::Void);
        self.push_expr(ExprKind::Call { callee, args }, ty)
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        let ty = match op {
            UnaryOp::Not => BuiltinType::Boolean,
            _ => self.type_of(operand),
        };
        self.push_expr(ExprKind::Unary { op, operand }, ty)
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        let ty = if op.is_relational()
            || op.is_equality()
            || matches!(op, BinaryOp::And | BinaryOp::Or)
        {
            BuiltinType::Boolean
        } else {
            self.type_of(lhs)
        };
        self.push_expr(ExprKind::Binary { op, lhs, rhs }, ty)
    }

    /// `var = value`
    pub fn assign(&mut self, var: VarId, value: ExprId) -> ExprId {
        let target = self.ident(var);
        self.binary(BinaryOp::Assign, target, value)
    }

    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        self.push_stmt(Stmt::Expr { expr })
    }

    pub fn compound(&mut self, stmts: Vec<StmtId>) -> StmtId {
        self.push_stmt(Stmt::Compound { stmts })
    }

    /// A top-level variable and its declaration statement (not yet added as an item).
    pub fn global_var(
        &mut self,
        name: impl Into<String>,
        ty: BuiltinType,
        init: Option<ExprId>,
    ) -> (VarId, StmtId) {
        self.var_decl(name, ty, init, DeclScope::TopLevel)
    }

    pub fn local_var(
        &mut self,
        name: impl Into<String>,
        ty: BuiltinType,
        init: Option<ExprId>,
    ) -> (VarId, StmtId) {
        self.var_decl(name, ty, init, DeclScope::Local)
    }

    fn var_decl(
        &mut self,
        name: impl Into<String>,
        ty: BuiltinType,
        init: Option<ExprId>,
        scope: DeclScope,
    ) -> (VarId, StmtId) {
        let var = self.push_var(VarDecl {
            name: name.into(),
            ty,
            init,
            scope,
            kind: VarKind::Variable,
        });
        let stmt = self.push_stmt(Stmt::VarDecl { vars: vec![var] });
        (var, stmt)
    }

    /// Register a function's signature so calls to it are typed before its body exists.
    pub fn declare_function(
        &mut self,
        name: impl Into<String>,
        params: &[(&str, BuiltinType)],
        return_type: Option<BuiltinType>,
    ) -> PendingFunction {
        let name = name.into();
        let params = params
            .iter()
            .map(|(param, ty)| {
                self.push_var(VarDecl {
                    name: (*param).to_string(),
                    ty: *ty,
                    init: None,
                    scope: DeclScope::Local,
                    kind: VarKind::Parameter,
                })
            })
            .collect();
        self.return_types
            .insert(name.clone(), return_type.unwrap_or(BuiltinType::Void));
        PendingFunction {
            name,
            params,
            return_type,
        }
    }

    /// Attach a body; returns the function declaration statement.
    pub fn define_function(&mut self, pending: PendingFunction, body: Vec<StmtId>) -> StmtId {
        let body = self.compound(body);
        let func = FuncId(self.module.functions.len() as u32);
        self.module.functions.push(FunctionDecl {
            name: pending.name,
            params: pending.params,
            return_type: pending.return_type,
            body,
        });
        self.push_stmt(Stmt::FunctionDecl { func })
    }

    pub fn if_stmt(
        &mut self,
        condition: ExprId,
        then_body: StmtId,
        else_body: Option<StmtId>,
    ) -> StmtId {
        self.push_stmt(Stmt::If {
            condition,
            then_body,
            else_body,
        })
    }

    pub fn begin_loop(&mut self) -> StmtId {
        self.push_stmt(Stmt::Compound { stmts: Vec::new() })
    }

    pub fn finish_while(&mut self, id: StmtId, condition: ExprId, body: StmtId) -> StmtId {
        self.replace_stmt(id, Stmt::While { condition, body })
    }

    pub fn finish_for(
        &mut self,
        id: StmtId,
        init: ForInit,
        condition: Option<ExprId>,
        updates: Vec<ExprId>,
        body: StmtId,
    ) -> StmtId {
        self.replace_stmt(
            id,
            Stmt::For {
                init,
                condition,
                updates,
                body,
            },
        )
    }

    pub fn while_stmt(&mut self, condition: ExprId, body: StmtId) -> StmtId {
        let id = self.begin_loop();
        self.finish_while(id, condition, body)
    }

    pub fn for_stmt(
        &mut self,
        init: ForInit,
        condition: Option<ExprId>,
        updates: Vec<ExprId>,
        body: StmtId,
    ) -> StmtId {
        let id = self.begin_loop();
        self.finish_for(id, init, condition, updates, body)
    }

    pub fn break_stmt(&mut self, target: StmtId) -> StmtId {
        self.push_stmt(Stmt::Break { target })
    }

    pub fn continue_stmt(&mut self, target: StmtId) -> StmtId {
        self.push_stmt(Stmt::Continue { target })
    }

    pub fn return_stmt(&mut self, value: Option<ExprId>) -> StmtId {
        self.push_stmt(Stmt::Return { value })
    }

    fn replace_stmt(&mut self, id: StmtId, stmt: Stmt) -> StmtId {
        if let Some(slot) = self.module.stmts.get_mut(id.index()) {
            *slot = stmt;
        }
        id
    }
}
