//! Dinho Bot, the scripted in-app helper.
//!
//! Replies come from a fixed keyword table checked in order against the
//! lowercased message, so the bot works offline and answers instantly. The
//! chat screen adds its own typing delay before showing the reply.

pub const GREETING: &str = "Olá! Eu sou o Dinho Bot, seu assistente virtual para o TechFinance. \
                            Como posso ajudar você hoje?";

const FALLBACK: &str = "Entendi sua pergunta! Sou especializado em ajudar com o sistema \
                        TechFinance. Posso fornecer informações sobre vendas, clientes, \
                        produtos, títulos e relatórios. Poderia ser mais específico sobre o \
                        que você precisa? Assim posso ajudar melhor!";

/// Keyword triggers and their canned replies, checked top to bottom. The
/// first row whose trigger appears in the message wins.
const RESPONSES: &[(&[&str], &str)] = &[
    (
        &["vendas", "venda"],
        "Posso ajudar você com informações sobre vendas! No módulo de vendas você pode \
         visualizar todas as transações, buscar por cliente ou produto, e acompanhar o \
         desempenho das vendas. Gostaria de saber algo específico sobre vendas?",
    ),
    (
        &["cliente", "clientes"],
        "No módulo de clientes você pode buscar informações detalhadas sobre cada cliente, \
         incluindo dados de contato, histórico de compras e grupo de classificação. Posso \
         ajudar você a encontrar informações específicas sobre algum cliente?",
    ),
    (
        &["produto", "produtos"],
        "O módulo de produtos permite buscar por código ou descrição, visualizar detalhes \
         dos produtos e gerenciar o inventário. Você pode encontrar todos os copos de \
         requeijão disponíveis e suas especificações. Precisa de ajuda com algum produto \
         específico?",
    ),
    (
        &["título", "títulos", "financeiro"],
        "No módulo de títulos você pode acompanhar todos os pagamentos, desde vencimentos \
         de hoje até atrasos superiores a 60 dias. Posso gerar insights sobre sua situação \
         financeira atual. Gostaria de uma análise dos seus títulos?",
    ),
    (
        &["relatório", "relatórios", "análise"],
        "Os relatórios oferecem insights valiosos sobre seu negócio, incluindo top produtos, \
         análise de clientes, variação de preços e muito mais. Posso ajudar você a \
         interpretar os dados ou sugerir relatórios específicos. Que tipo de análise você \
         precisa?",
    ),
    (
        &["ajuda", "help"],
        "Estou aqui para ajudar! Posso fornecer informações sobre:\n\n📊 **Vendas** - \
         Consultar transações e desempenho\n👥 **Clientes** - Buscar dados e histórico\n📦 \
         **Produtos** - Verificar inventário e detalhes\n💰 **Títulos** - Acompanhar \
         pagamentos e atrasos\n📈 **Relatórios** - Análises e insights\n\nSobre o que você \
         gostaria de saber mais?",
    ),
    (
        &["obrigado", "obrigada", "valeu"],
        "De nada! Fico feliz em ajudar. Se precisar de mais alguma coisa sobre o \
         TechFinance, estarei sempre aqui. 😊",
    ),
];

/// Pick the reply for a message. Total: unknown input gets the fallback.
pub fn reply_to(input: &str) -> &'static str {
    let message = input.to_lowercase();
    RESPONSES
        .iter()
        .find(|(triggers, _)| triggers.iter().any(|t| message.contains(t)))
        .map(|(_, reply)| *reply)
        .unwrap_or(FALLBACK)
}
